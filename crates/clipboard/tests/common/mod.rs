use std::time::Duration;

use clipmux_base::{ClipDescriptor, ClipItem, Handle, ItemDescriptor};
use clipmux_clipboard::{
    ClipboardLoad, ClipboardLoadExt, ClipboardStore, ClipboardStoreExt, ClipboardSubscribe,
    ClipboardWait, Error,
};

const AUTHORITY: &str = "org.example.provider";

pub trait ClipboardTester {
    type Clipboard: 'static
        + Clone
        + Sync
        + Send
        + ClipboardSubscribe
        + ClipboardLoad
        + ClipboardStore;

    fn new_clipboard(&self) -> Result<Self::Clipboard, Error>;

    fn run(&self) -> Result<(), Error> {
        self.test_clean()?;

        for n in [1, 3, 16] {
            println!("test with {n} item(s)");
            self.test_store_and_load(n)?;
        }

        self.test_subscribe()?;
        Ok(())
    }

    fn test_store_and_load(&self, n: usize) -> Result<(), Error> {
        let clipboard = self.new_clipboard()?;

        let mime: mime::Mime = "x/int".parse().expect("valid MIME type");
        let items = (0..n)
            .map(|_| {
                ItemDescriptor::new(Handle::new(), mime.clone())
                    .to_clip_item(AUTHORITY)
                    .expect("valid authority")
            })
            .collect::<Vec<_>>();
        let descriptor = ClipDescriptor::new(items);
        clipboard.store(descriptor.clone())?;

        let loaded = clipboard.load()?;
        assert_eq!(loaded, descriptor);
        assert_eq!(loaded.handles_of(AUTHORITY).count(), n);
        assert!(clipboard.has_mime_type(&mime));
        assert_eq!(clipboard.load_mime_types()?, vec![mime]);

        Ok(())
    }

    fn test_clean(&self) -> Result<(), Error> {
        let data = "This is a string";
        let clipboard = self.new_clipboard()?;

        clipboard.store_text(data)?;
        assert_eq!(clipboard.load()?.items(), &[ClipItem::Text(data.to_string())]);
        assert_eq!(clipboard.load_text()?, data);

        clipboard.clear()?;
        assert!(matches!(clipboard.load(), Err(Error::Empty)));
        assert!(clipboard.is_empty());

        Ok(())
    }

    fn test_subscribe(&self) -> Result<(), Error> {
        let clipboard = self.new_clipboard()?;
        clipboard.clear()?;

        let observer1 = std::thread::spawn({
            let subscriber = clipboard.subscribe()?;
            let clipboard = clipboard.clone();
            move || -> Result<String, Error> {
                loop {
                    subscriber.wait()?;
                    match clipboard.load_text() {
                        Ok(data) => return Ok(data),
                        Err(Error::Empty) => continue,
                        Err(err) => return Err(err),
                    }
                }
            }
        });

        let observer2 = std::thread::spawn({
            let subscriber = clipboard.subscribe()?;
            move || -> Result<(), Error> {
                while subscriber.wait().is_ok() {}
                Ok(())
            }
        });

        std::thread::sleep(Duration::from_millis(50));
        let input = "notified";
        clipboard.store_text(input)?;

        let output = observer1.join().expect("observer does not panic")?;
        assert_eq!(input, output);

        drop(clipboard);
        observer2.join().expect("observer does not panic")?;

        Ok(())
    }
}
