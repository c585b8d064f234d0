use std::{
    error::Error,
    fmt::{self, Display},
    io,
    net::SocketAddr,
};

use comms::{GradientBatch, ParameterSnapshot};
use reqwest::{Client, StatusCode, header};

/// Error returned by the `ParameterClient` operations.
#[derive(Debug)]
pub enum ClientError {
    /// The request couldn't be sent or its response couldn't be read.
    Http(reqwest::Error),
    /// The server answered with a non success status.
    Status { status: StatusCode, message: String },
    /// The payload couldn't be encoded or the response couldn't be decoded.
    Codec(io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<io::Error> for ClientError {
    fn from(value: io::Error) -> Self {
        Self::Codec(value)
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "request failed: {e}"),
            Self::Status { status, message } => write!(f, "server answered {status}: {message}"),
            Self::Codec(e) => write!(f, "codec error: {e}"),
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Status { .. } => None,
            Self::Codec(e) => Some(e),
        }
    }
}

/// The worker side of the parameter server protocol.
///
/// It doesn't retry, a failed call is reported as is.
#[derive(Debug, Clone)]
pub struct ParameterClient {
    client: Client,
    base: String,
}

impl ParameterClient {
    /// Creates a new `ParameterClient`.
    ///
    /// # Arguments
    /// * `addr` - The address of the parameter server.
    ///
    /// # Returns
    /// A new `ParameterClient` instance.
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            client: Client::new(),
            base: format!("http://{addr}"),
        }
    }

    /// Asks the server to identify itself.
    ///
    /// # Returns
    /// The name of the service or a `ClientError`.
    pub async fn ping(&self) -> Result<String, ClientError> {
        let res = self.client.get(self.url("/")).send().await?;
        let res = Self::check(res).await?;
        Ok(res.text().await?)
    }

    /// Fetches the current parameters.
    ///
    /// # Returns
    /// The server's last published snapshot or a `ClientError`.
    pub async fn fetch(&self) -> Result<ParameterSnapshot, ClientError> {
        let res = self.client.get(self.url("/parameters")).send().await?;
        let bytes = Self::check(res).await?.bytes().await?;
        Ok(comms::decode(&bytes)?)
    }

    /// Pushes gradients to be applied in one optimization step.
    ///
    /// # Arguments
    /// * `grads` - One gradient per parameter, in the snapshot's order.
    ///
    /// # Returns
    /// The server's acknowledgment or a `ClientError`.
    pub async fn push(&self, grads: &GradientBatch) -> Result<String, ClientError> {
        self.push_raw(comms::encode(grads)?.to_vec()).await
    }

    /// Pushes an already encoded payload as is.
    ///
    /// # Arguments
    /// * `payload` - The raw request body.
    ///
    /// # Returns
    /// The server's acknowledgment or a `ClientError`.
    pub async fn push_raw(&self, payload: Vec<u8>) -> Result<String, ClientError> {
        let res = self
            .client
            .post(self.url("/update"))
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(payload)
            .send()
            .await?;

        let res = Self::check(res).await?;
        Ok(res.text().await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn check(res: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let message = res.text().await.unwrap_or_default();
        Err(ClientError::Status { status, message })
    }
}
