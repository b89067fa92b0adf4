use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReferrerSource {
    Direct,
    Internal,
    Google,
    Bing,
    Yahoo,
    DuckDuckGo,
    Baidu,
    Yandex,
    Facebook,
    Twitter,
    LinkedIn,
    Reddit,
    Referral,
}

impl ReferrerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferrerSource::Direct => "direct",
            ReferrerSource::Internal => "internal",
            ReferrerSource::Google => "google",
            ReferrerSource::Bing => "bing",
            ReferrerSource::Yahoo => "yahoo",
            ReferrerSource::DuckDuckGo => "duckduckgo",
            ReferrerSource::Baidu => "baidu",
            ReferrerSource::Yandex => "yandex",
            ReferrerSource::Facebook => "facebook",
            ReferrerSource::Twitter => "twitter",
            ReferrerSource::LinkedIn => "linkedin",
            ReferrerSource::Reddit => "reddit",
            ReferrerSource::Referral => "referral",
        }
    }

    pub fn is_search_engine(&self) -> bool {
        SEARCH_ENGINES.iter().any(|engine| engine.source == *self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferrerInfo {
    pub source: ReferrerSource,
    pub query: Option<String>,
}

impl ReferrerInfo {
    fn bare(source: ReferrerSource) -> Self {
        Self { source, query: None }
    }
}

enum HostRule {
    /// The host is the domain itself or one of its subdomains.
    Domain(&'static str),
    /// Any label of the host equals this, e.g. `google` in `www.google.co.uk`.
    Label(&'static str),
}

impl HostRule {
    fn matches(&self, host: &str) -> bool {
        match self {
            HostRule::Domain(domain) => host_in_domain(host, domain),
            HostRule::Label(label) => host.split('.').any(|part| part == *label),
        }
    }
}

struct SearchEngine {
    source: ReferrerSource,
    hosts: &'static [HostRule],
    query_param: &'static str,
}

const SEARCH_ENGINES: &[SearchEngine] = &[
    SearchEngine {
        source: ReferrerSource::Google,
        hosts: &[HostRule::Label("google")],
        query_param: "q",
    },
    SearchEngine {
        source: ReferrerSource::Bing,
        hosts: &[HostRule::Domain("bing.com")],
        query_param: "q",
    },
    SearchEngine {
        source: ReferrerSource::Yahoo,
        hosts: &[HostRule::Domain("yahoo.com"), HostRule::Label("yahoo")],
        query_param: "p",
    },
    SearchEngine {
        source: ReferrerSource::DuckDuckGo,
        hosts: &[HostRule::Domain("duckduckgo.com")],
        query_param: "q",
    },
    SearchEngine {
        source: ReferrerSource::Baidu,
        hosts: &[HostRule::Domain("baidu.com")],
        query_param: "wd",
    },
    SearchEngine {
        source: ReferrerSource::Yandex,
        hosts: &[HostRule::Label("yandex")],
        query_param: "text",
    },
];

const SOCIAL_PLATFORMS: &[(ReferrerSource, &[HostRule])] = &[
    (
        ReferrerSource::Facebook,
        &[HostRule::Domain("facebook.com"), HostRule::Domain("fb.com")],
    ),
    (
        ReferrerSource::Twitter,
        &[
            HostRule::Domain("twitter.com"),
            HostRule::Domain("x.com"),
            HostRule::Domain("t.co"),
        ],
    ),
    (ReferrerSource::LinkedIn, &[HostRule::Domain("linkedin.com")]),
    (ReferrerSource::Reddit, &[HostRule::Domain("reddit.com")]),
];

fn host_in_domain(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Classifies a `document.referrer`-style string into a traffic source.
///
/// Never fails: empty or unparseable input is a direct visit. `site_domain`
/// is the site's own registrable domain; referrers on it (or a subdomain) are
/// internal navigation.
pub fn classify_referrer(referrer: &str, site_domain: &str) -> ReferrerInfo {
    let referrer = referrer.trim();
    if referrer.is_empty() {
        return ReferrerInfo::bare(ReferrerSource::Direct);
    }

    let url = match Url::parse(referrer) {
        Ok(url) => url,
        Err(_) => return ReferrerInfo::bare(ReferrerSource::Direct),
    };

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

    let site_domain = site_domain.trim().to_ascii_lowercase();
    if !site_domain.is_empty() && host_in_domain(&host, &site_domain) {
        return ReferrerInfo::bare(ReferrerSource::Internal);
    }

    if let Some(engine) = SEARCH_ENGINES
        .iter()
        .find(|engine| engine.hosts.iter().any(|rule| rule.matches(&host)))
    {
        let query = url
            .query_pairs()
            .find(|(key, _)| key == engine.query_param)
            .map(|(_, value)| value.into_owned());
        return ReferrerInfo {
            source: engine.source,
            query,
        };
    }

    if let Some((source, _)) = SOCIAL_PLATFORMS
        .iter()
        .find(|(_, hosts)| hosts.iter().any(|rule| rule.matches(&host)))
    {
        return ReferrerInfo::bare(*source);
    }

    ReferrerInfo::bare(ReferrerSource::Referral)
}
