//! Terminal notifier: the message boxes of a desktop front end, printed instead.

use horizon_vision::Notifier;

#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn info(&mut self, title: &str, message: &str) {
        println!("{title}: {message}");
    }

    fn warn(&mut self, title: &str, message: &str) {
        eprintln!("{title}: {message}");
    }

    fn error(&mut self, title: &str, message: &str) {
        eprintln!("{title}: {message}");
    }
}
