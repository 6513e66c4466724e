//! Statement input: page texts as handed over by the PDF text extractor.

/// Ordered page texts of one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statement {
    pages: Vec<String>,
}

impl Statement {
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
        }
    }

    /// Split `pdftotext` style output, where pages end with a form feed.
    pub fn from_form_feed_text(text: &str) -> Self {
        let mut pages: Vec<String> = text.split('\x0c').map(str::to_string).collect();
        // pdftotext terminates the last page with a form feed too
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        Self { pages }
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every line of every page, in document order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|p| p.lines())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_feed_split() {
        let s = Statement::from_form_feed_text("page one\nline\x0cpage two\x0c");
        assert_eq!(s.page_count(), 2);
        assert_eq!(s.pages()[1], "page two");
        assert_eq!(s.lines().collect::<Vec<_>>(), vec!["page one", "line", "page two"]);
    }

    #[test]
    fn test_single_page_without_form_feed() {
        let s = Statement::from_form_feed_text("only page");
        assert_eq!(s.page_count(), 1);
    }

    #[test]
    fn test_from_pages_keeps_order() {
        let s = Statement::from_pages(["a", "b", "c"]);
        assert_eq!(s.pages(), &["a".to_string(), "b".to_string(), "c".to_string()]);
    }
}
