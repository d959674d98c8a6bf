//! Hypermedia links attached to every response

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use crate::repositories::Page;

/// Version prefix of every resource route
pub const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub method: &'static str,
    pub href: String,
}

impl Link {
    pub fn new(method: &'static str, href: impl Into<String>) -> Self {
        Self {
            method,
            href: href.into(),
        }
    }

    pub fn get(href: impl Into<String>) -> Self {
        Self::new("GET", href)
    }
}

/// Relation name to link
pub type Links = BTreeMap<&'static str, Link>;

/// Builds links from the public base URL
#[derive(Debug, Clone)]
pub struct LinkProvider {
    base_url: String,
}

impl LinkProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> String {
        format!("{}{}", self.base_url, API_PREFIX)
    }

    pub fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.api_url(), collection)
    }

    pub fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), id)
    }

    /// Entry points listed by the API index
    pub fn home_links(&self, collections: &[&'static str]) -> Links {
        let mut links = Links::new();
        links.insert("self", Link::get(self.api_url()));
        for collection in collections {
            links.insert(*collection, Link::get(self.collection_url(collection)));
        }
        if collections.contains(&"users") {
            links.insert("register", Link::new("POST", self.collection_url("users")));
        }
        links
    }

    pub fn document_links(&self, collection: &str, id: &str) -> Links {
        let document_url = self.document_url(collection, id);
        Links::from([
            ("self", Link::get(&document_url)),
            ("collection", Link::get(self.collection_url(collection))),
            ("update", Link::new("PATCH", &document_url)),
            ("replace", Link::new("PUT", &document_url)),
            ("delete", Link::new("DELETE", document_url)),
        ])
    }

    pub fn collection_links(&self, collection: &str, page: Page, count: usize) -> Links {
        let collection_url = self.collection_url(collection);
        let page_url = |page: Page| {
            format!(
                "{}?pageSize={}&pageStartIndex={}",
                collection_url, page.size, page.start
            )
        };

        let mut links = Links::new();
        links.insert("self", Link::get(page_url(page)));
        if page.has_previous() {
            links.insert("prev", Link::get(page_url(page.previous())));
        }
        if page.has_next(count) {
            links.insert("next", Link::get(page_url(page.next())));
        }
        links.insert("create", Link::new("POST", &collection_url));
        links
    }

    /// Wrap each document as `{ data, links: { self } }`
    pub fn populate(&self, collection: &str, documents: Vec<Value>) -> Vec<Value> {
        documents
            .into_iter()
            .map(|document| {
                let href = document["id"]
                    .as_str()
                    .map(|id| self.document_url(collection, id))
                    .unwrap_or_else(|| self.collection_url(collection));
                json!({ "data": document, "links": { "self": Link::get(href) } })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> LinkProvider {
        LinkProvider::new("http://ski.test/")
    }

    #[test]
    fn test_urls() {
        let links = provider();
        assert_eq!(links.api_url(), "http://ski.test/api/v1");
        assert_eq!(links.collection_url("tours"), "http://ski.test/api/v1/tours");
        assert_eq!(links.document_url("tours", "42"), "http://ski.test/api/v1/tours/42");
    }

    #[test]
    fn test_document_links() {
        let links = provider().document_links("tours", "42");
        assert_eq!(links["self"], Link::get("http://ski.test/api/v1/tours/42"));
        assert_eq!(links["delete"].method, "DELETE");
        assert_eq!(links["collection"].href, "http://ski.test/api/v1/tours");
    }

    #[test]
    fn test_collection_links_paging() {
        let links = provider().collection_links("tours", Page::new(10, 0), 25);
        assert!(!links.contains_key("prev"));
        assert_eq!(
            links["next"].href,
            "http://ski.test/api/v1/tours?pageSize=10&pageStartIndex=10"
        );

        let links = provider().collection_links("tours", Page::new(10, 20), 25);
        assert_eq!(
            links["prev"].href,
            "http://ski.test/api/v1/tours?pageSize=10&pageStartIndex=10"
        );
        assert!(!links.contains_key("next"));
    }

    #[test]
    fn test_collection_links_at_largest_start_index() {
        let page = Page::new(20, usize::MAX);
        let links = provider().collection_links("tours", page, 30);

        assert!(!links.contains_key("next"));
        assert_eq!(
            links["prev"].href,
            format!(
                "http://ski.test/api/v1/tours?pageSize=20&pageStartIndex={}",
                usize::MAX - 20
            )
        );
    }

    #[test]
    fn test_home_links() {
        let links = provider().home_links(&["tours", "users"]);
        assert_eq!(links["tours"].href, "http://ski.test/api/v1/tours");
        assert_eq!(links["register"].method, "POST");
        assert!(!links.contains_key("webhooks"));
    }

    #[test]
    fn test_populate() {
        let populated = provider().populate("users", vec![json!({ "id": "7", "username": "a" })]);
        assert_eq!(populated[0]["data"]["username"], "a");
        assert_eq!(populated[0]["links"]["self"]["href"], "http://ski.test/api/v1/users/7");
    }
}
