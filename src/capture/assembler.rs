//! Element assembly
//!
//! Reconstructs page elements from intercepted requests: a GET becomes a
//! Link, a POST becomes a Form with its body decoded into inputs. Other
//! methods carry no element.

use crate::intercept::InterceptedRequest;
use crate::model::{forms, Form, Link, Method, PageElement};

/// Builds page elements from intercepted requests
#[derive(Debug, Default)]
pub struct ElementAssembler;

impl ElementAssembler {
    /// Create a new assembler
    pub fn new() -> Self {
        Self
    }

    /// Assemble the element (if any) that one request contributes to the
    /// page identified by `top_url`
    pub fn assemble(&self, top_url: &str, request: &InterceptedRequest) -> Option<PageElement> {
        match request.method {
            Method::Get => Some(PageElement::Link(Link {
                page_url: top_url.to_string(),
                action_url: request.url.clone(),
            })),
            Method::Post => Some(PageElement::Form(Form {
                page_url: top_url.to_string(),
                action_url: request.url.clone(),
                method: Method::Post,
                inputs: forms::parse_form_body(&request.body),
            })),
            _ => None,
        }
    }
}
