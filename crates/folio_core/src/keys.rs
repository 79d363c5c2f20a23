//! Cache key layout. Every key is a pure function of the query that filled it.

const PREFIX: &str = "hashnode";

pub fn articles(subject: &str, page: u32, page_size: u32) -> String {
    format!("{}:articles:{}:{}:{}", PREFIX, subject, page, page_size)
}

pub fn series(subject: &str) -> String {
    format!("{}:series:{}", PREFIX, subject)
}

/// Pattern matching every key that belongs to `subject`.
pub fn subject_pattern(subject: &str) -> String {
    format!("{}:*{}*", PREFIX, subject)
}
