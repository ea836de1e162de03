// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

use hyper::header::{CONTENT_TYPE, USER_AGENT};
use hyper::{Body, Uri};
use log::{debug, trace};

use crate::config::ClientConfig;
use crate::error::ClientError;
use super::decoding::decode_response;
use super::protocol::{MethodCall, MethodResponse};
use super::value::Value;

/// Carries encoded request bytes to an endpoint and brings the response
/// bytes back untouched.
pub trait Transport {
    fn post(&self, body: Vec<u8>) -> Result<Vec<u8>, ClientError>;
}

/// Blocking HTTP POST with `Content-Type: text/xml`. Plain `http://` only.
pub struct HttpTransport {
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> HttpTransport {
        HttpTransport { config }
    }
}

impl Transport for HttpTransport {
    fn post(&self, body: Vec<u8>) -> Result<Vec<u8>, ClientError> {
        let uri: Uri = self.config.url.parse()?;
        let request = hyper::Request::post(uri)
            .header(CONTENT_TYPE, "text/xml")
            .header(USER_AGENT, self.config.user_agent.as_str())
            .body(Body::from(body))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        runtime.block_on(async {
            let exchange = async {
                let client = hyper::Client::new();
                let response = client.request(request).await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(ClientError::Status(status.as_u16()));
                }
                let bytes = hyper::body::to_bytes(response.into_body()).await?;
                Ok::<_, ClientError>(bytes.to_vec())
            };
            match self.config.timeout {
                Some(limit) => tokio::time::timeout(limit, exchange)
                    .await
                    .map_err(|_| ClientError::Timeout)?,
                None => exchange.await,
            }
        })
    }
}

pub struct Client<T = HttpTransport> {
    url: String,
    transport: T,
}

impl Client<HttpTransport> {
    pub fn new(config: ClientConfig) -> Client<HttpTransport> {
        Client {
            url: config.url.clone(),
            transport: HttpTransport::new(config),
        }
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(url: &str, transport: T) -> Client<T> {
        Client {
            url: url.to_string(),
            transport,
        }
    }

    /// Sends the call; a fault is a successful exchange here.
    pub fn call(&self, call: &MethodCall) -> Result<MethodResponse, ClientError> {
        let body = call.to_bytes()?;

        debug!("Send XMLRPC request {} to: {}", call.method, self.url);
        trace!("XMLRPC body: {}", String::from_utf8_lossy(&body));

        let response = self.transport.post(body)?;

        trace!("Response body: {}", String::from_utf8_lossy(&response));

        Ok(decode_response(&response[..])?)
    }

    /// Like [`call`](Client::call), but a fault becomes `ClientError::Fault`.
    pub fn invoke(&self, call: &MethodCall) -> Result<Vec<Value>, ClientError> {
        self.call(call)?.into_result().map_err(|fault| {
            debug!("XMLRPC fault {}: {}", fault.code(), fault.message());
            ClientError::Fault(fault)
        })
    }
}
