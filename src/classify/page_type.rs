use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PageType {
    Home,
    Blog,
    BlogPost,
    Service,
    Industry,
    Location,
    CountrySeo,
    Pricing,
    Contact,
    Company,
    Legal,
    Other,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Home => "home",
            PageType::Blog => "blog",
            PageType::BlogPost => "blog-post",
            PageType::Service => "service",
            PageType::Industry => "industry",
            PageType::Location => "location",
            PageType::CountrySeo => "country-seo",
            PageType::Pricing => "pricing",
            PageType::Contact => "contact",
            PageType::Company => "company",
            PageType::Legal => "legal",
            PageType::Other => "other",
        }
    }

    /// Maps a URL path to its content category. Rules are checked in order;
    /// the first hit wins.
    pub fn classify(path: &str) -> Self {
        match path {
            "/" => return PageType::Home,
            "/blog" => return PageType::Blog,
            _ => {}
        }

        if path.starts_with("/blog/") {
            return PageType::BlogPost;
        }
        if path.starts_with("/services/") || path == "/services" {
            return PageType::Service;
        }
        if path.starts_with("/industries/") {
            return PageType::Industry;
        }
        if path.starts_with("/locations/") {
            return PageType::Location;
        }
        // Country landing pages live at the root, e.g. `/usa-seo-services`.
        if path.ends_with("-seo-services") {
            return PageType::CountrySeo;
        }

        match path {
            "/pricing" => PageType::Pricing,
            "/contact" => PageType::Contact,
            "/company" => PageType::Company,
            "/privacy" | "/terms" => PageType::Legal,
            _ => PageType::Other,
        }
    }
}
