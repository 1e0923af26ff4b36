use crate::http::{HttpResponse, InterceptedRequest};
use crate::lifecycle::ClientId;

/// A request delivered to the interception point
#[derive(Debug, Clone, PartialEq)]
pub struct FetchEvent {
    pub request: InterceptedRequest,
    /// Client the request originated from, if any
    pub client: Option<ClientId>,
    /// Navigation preload response the platform already has in hand
    pub preload: Option<HttpResponse>,
}

impl FetchEvent {
    #[must_use]
    pub fn new(request: InterceptedRequest) -> Self {
        Self {
            request,
            client: None,
            preload: None,
        }
    }

    #[must_use]
    pub fn from_client(mut self, client: ClientId) -> Self {
        self.client = Some(client);
        self
    }

    #[must_use]
    pub fn with_preload(mut self, response: HttpResponse) -> Self {
        self.preload = Some(response);
        self
    }
}
