// WAPI HTTP client
//
// Wraps `reqwest::Client` with grid-master URL construction, basic auth,
// paging and WAPI error decoding. The object-specific queries live in the
// sibling modules (ipam, dhcp, dns) as inherent methods.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{Credentials, TransportConfig};
use crate::wapi::models::{WapiErrorBody, WapiObject, WapiResult};

/// Default WAPI schema version.
pub const DEFAULT_WAPI_VERSION: &str = "v2.13.1";

/// Default number of objects requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Raw HTTP client for the InfoBlox WAPI.
///
/// All searches are issued with `_paging=1&_return_as_object=1` and every
/// page is folded into a single `Vec` before it is returned, so callers never
/// see partial collections.
pub struct WapiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    page_size: u32,
}

impl WapiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client from credentials and a transport config.
    ///
    /// `base_url` is the versioned WAPI root, e.g.
    /// `https://gm.example.com/wapi/v2.13.1/` (see [`Self::base_url_for`]).
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http, credentials)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(
        base_url: &str,
        http: reqwest::Client,
        credentials: Credentials,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            credentials,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Override the page size used for searches.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Build the versioned WAPI root for a grid master host.
    ///
    /// `host` may be a bare hostname (`gm.example.com`), a host with port,
    /// or a full URL; a missing scheme defaults to `https`.
    pub fn base_url_for(host: &str, version: &str) -> Result<Url, Error> {
        let host = host.trim().trim_end_matches('/');
        let root = if host.contains("://") {
            host.to_owned()
        } else {
            format!("https://{host}")
        };
        let version = version.trim().trim_matches('/');
        Ok(Url::parse(&format!("{root}/wapi/{version}/"))?)
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The versioned WAPI root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Objects requested per page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append an object path (`record:a`, `network`, or an object reference)
    /// to the base URL.
    ///
    /// `Url::join` would read `record:a` as an absolute URL with scheme
    /// `record`, so the path is concatenated instead.
    pub(crate) fn object_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!("GET {url} params={params:?}");

        let req = self.http.get(url).query(params);
        let resp = self.credentials.apply(req).send().await?;
        self.handle_response(resp).await
    }

    /// Search a WAPI object type, folding every page into one `Vec`.
    ///
    /// `filters` are passed verbatim as query parameters; `return_fields`
    /// is sent as `_return_fields+` so the default fields (including
    /// `_ref`) are always present.
    pub async fn search<T: DeserializeOwned>(
        &self,
        object: &str,
        filters: &[(&str, String)],
        return_fields: &str,
    ) -> Result<Vec<T>, Error> {
        let url = self.object_url(object)?;

        let mut params: Vec<(&str, String)> = filters.to_vec();
        params.push(("_return_fields+", return_fields.to_owned()));
        params.push(("_paging", "1".into()));
        params.push(("_return_as_object", "1".into()));
        params.push(("_max_results", self.page_size.to_string()));

        let mut page: WapiResult<T> = self.get_json(url.clone(), &params).await?;
        let mut all = Vec::new();
        let mut pages = 1_usize;

        loop {
            let received = page.result.len();
            all.extend(page.result);

            match page.next_page_id {
                Some(page_id) if !page_id.is_empty() && received > 0 => {
                    pages += 1;
                    page = self
                        .get_json(url.clone(), &[("_page_id", page_id)])
                        .await?;
                }
                _ => break,
            }
        }

        debug!(object, pages, total = all.len(), "search complete");
        Ok(all)
    }

    /// Fetch a single object by its `_ref`.
    ///
    /// Returns `Ok(None)` when WAPI reports the reference as unknown.
    pub async fn get_object<T: DeserializeOwned>(
        &self,
        reference: &str,
        return_fields: &str,
    ) -> Result<Option<T>, Error> {
        let url = self.object_url(reference)?;
        let params = [
            ("_return_fields+", return_fields.to_owned()),
            ("_return_as_object", "1".to_owned()),
        ];

        match self.get_json::<WapiObject<T>>(url, &params).await {
            Ok(obj) => Ok(Some(obj.result)),
            Err(e) if e.is_not_found() => {
                debug!(reference, "object not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Authentication {
                message: format!("grid master rejected credentials for '{}'", self.credentials.username),
            };
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(body) = serde_json::from_str::<WapiErrorBody>(&raw) {
            let message = match (body.error, body.text) {
                (Some(err), Some(text)) if !text.is_empty() && !err.contains(&text) => {
                    format!("{err}: {text}")
                }
                (Some(err), _) => err,
                (None, Some(text)) => text,
                (None, None) => status.to_string(),
            };
            Error::Wapi {
                status: status.as_u16(),
                message,
                code: body.code,
            }
        } else {
            Error::Wapi {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
            }
        }
    }
}
