//! Navigation side effects triggered by clickable regions

/// Something that can be sent to a new location
pub trait Navigator {
    fn navigate(&mut self, location: &str);

    /// The most recent location navigated to, if any
    fn current(&self) -> Option<&str>;
}

/// Default navigator: logs every navigation and keeps the history
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Vec<String>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&mut self, location: &str) {
        log::info!("Navigating to {location}");
        self.history.push(location.to_string());
    }

    fn current(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_records_locations_in_order() {
        let mut navigator = HistoryNavigator::new();
        assert_eq!(navigator.current(), None);

        navigator.navigate("/");
        navigator.navigate("/about");

        assert_eq!(navigator.history(), ["/".to_string(), "/about".to_string()]);
        assert_eq!(navigator.current(), Some("/about"));
    }
}
