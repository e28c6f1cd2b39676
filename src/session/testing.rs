// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory transport for session tests.

use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::Mutex;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, SET_COOKIE};

use crate::error::ProtocolError;
use crate::protocol::{Exchange, ExchangeRequest, Transport};

/// A canned response.
pub(crate) struct Reply {
    status: u16,
    content_type: &'static str,
    body: String,
    cookie: Option<&'static str>,
}

impl Reply {
    pub(crate) fn with_cookie(mut self, cookie: &'static str) -> Self {
        self.cookie = Some(cookie);
        self
    }

    fn into_exchange(self) -> Exchange {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        if let Some(cookie) = self.cookie {
            headers.insert(SET_COOKIE, HeaderValue::from_static(cookie));
        }
        Exchange::new(self.status, headers, self.body)
    }
}

pub(crate) fn response(status: u16, content_type: &'static str, body: &str) -> Reply {
    Reply {
        status,
        content_type,
        body: body.to_string(),
        cookie: None,
    }
}

pub(crate) fn json_response(body: &str) -> Reply {
    response(200, "text/json", body)
}

/// Replays queued responses and records every request it receives.
#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    replies: Mutex<VecDeque<Result<Exchange, ProtocolError>>>,
    requests: Mutex<Vec<ExchangeRequest>>,
    address: Option<IpAddr>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes local lookups resolve to `address`.
    pub(crate) fn resolving_to(address: IpAddr) -> Self {
        Self {
            address: Some(address),
            ..Self::default()
        }
    }

    pub(crate) fn push(&self, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(reply.into_exchange()));
    }

    pub(crate) fn push_error(&self, err: ProtocolError) {
        self.replies.lock().unwrap().push_back(Err(err));
    }

    pub(crate) fn requests(&self) -> Vec<ExchangeRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for FakeTransport {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<Exchange, ProtocolError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(ProtocolError::ConnectionFailed(
                "no reply queued".to_string(),
            ))
        })
    }

    async fn lookup(&self, hostname: &str) -> Result<IpAddr, ProtocolError> {
        self.address
            .ok_or_else(|| ProtocolError::InvalidAddress(format!("{hostname} did not resolve")))
    }
}
