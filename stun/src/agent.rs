//! STUN agent: compatibility/usage knobs over the codec, plus
//! outstanding-transaction bookkeeping.

use std::collections::HashMap;
use std::time::Instant;

use crate::attribute::TYPE_MESSAGE_INTEGRITY;
use crate::timer::Timer;
use crate::{match_messages, verify_key, verify_password, Attribute, Class, MatchResult, Message, Method, MsVersion, TransactionId};

/// OC2007 announces itself as version `1` in MS-VERSION.
const OC2007_VERSION: u32 = 1;

/// Which dialect of the protocol the agent speaks. `OC2007` additionally
/// stamps MS-VERSION on every message it builds; MS-SEQUENCE-NUMBER is
/// per-connection state owned by the TURN client socket, not the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    Rfc5389,
    Rfc3489,
    Oc2007,
}

/// Which credential/authentication regime applies to messages this
/// agent builds and validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    LongTerm,
    ShortTerm,
    IgnoreCredentials,
    NoIndicationAuth,
    NoAlignedAttributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    Success,
    BadRequest,
    Unauthorized,
    UnknownAttribute,
    UnmatchedResponse,
    BadFingerprint,
}

struct Outstanding {
    request: Message,
    timer: Timer,
}

pub struct Agent {
    compatibility: Compatibility,
    usage: Usage,
    outstanding: HashMap<TransactionId, Outstanding>,
}

impl Agent {
    pub fn new(compatibility: Compatibility, usage: Usage) -> Self {
        Self {
            compatibility,
            usage,
            outstanding: HashMap::new(),
        }
    }

    pub fn compatibility(&self) -> Compatibility {
        self.compatibility
    }

    pub fn usage(&self) -> Usage {
        self.usage
    }

    /// Validates an inbound message against this agent's credential
    /// regime. `key` is the HMAC key (short-term password or long-term
    /// `MD5(username:realm:password)`) to verify against, when the
    /// usage requires authentication.
    pub fn validate(&self, msg: &Message, key: Option<&[u8]>) -> ValidationStatus {
        if !msg.unknown_comprehension_required().is_empty() {
            return ValidationStatus::UnknownAttribute;
        }

        let requires_auth = !matches!(
            self.usage,
            Usage::IgnoreCredentials
        ) && !(self.usage == Usage::NoIndicationAuth && msg.header.class == Class::Indication);

        if requires_auth {
            match key {
                Some(key) => {
                    let verified = match self.usage {
                        Usage::ShortTerm | Usage::NoIndicationAuth | Usage::NoAlignedAttributes => {
                            verify_password(msg, key)
                        }
                        _ => verify_key(msg, key),
                    };
                    match verified {
                        Ok(true) => {}
                        Ok(false) => return ValidationStatus::Unauthorized,
                        Err(_) if msg.find(TYPE_MESSAGE_INTEGRITY).is_none() => {
                            return ValidationStatus::BadRequest
                        }
                        Err(_) => return ValidationStatus::BadFingerprint,
                    }
                }
                None => return ValidationStatus::Unauthorized,
            }
        }

        if matches!(msg.header.class, Class::Success | Class::Error)
            && !self.outstanding.contains_key(&msg.header.transaction_id)
        {
            return ValidationStatus::UnmatchedResponse;
        }

        ValidationStatus::Success
    }

    /// Stamps MS-VERSION on `msg` if this agent speaks OC2007; a no-op
    /// for every other compatibility.
    fn stamp_compatibility(&self, msg: Message) -> Message {
        match self.compatibility {
            Compatibility::Oc2007 => msg.and_attribute(Attribute::MsVersion(MsVersion(OC2007_VERSION))),
            Compatibility::Rfc5389 | Compatibility::Rfc3489 => msg,
        }
    }

    pub fn init_request(&mut self, method: Method) -> Message {
        let msg = self.stamp_compatibility(Message::build_request(method));
        self.track(msg.clone());
        msg
    }

    pub fn init_indication(&self, method: Method) -> Message {
        self.stamp_compatibility(Message::build_indication(method))
    }

    pub fn init_response(&self, request: &Message) -> Message {
        self.stamp_compatibility(Message::build_response(request))
    }

    pub fn init_error(
        &self,
        request: &Message,
        numeric_code: crate::NumericCode,
        reason: &str,
    ) -> Message {
        self.stamp_compatibility(Message::build_error(request, numeric_code, reason))
    }

    fn track(&mut self, request: Message) {
        let id = request.header.transaction_id;
        self.outstanding.insert(
            id,
            Outstanding {
                request,
                timer: Timer::unreliable(Instant::now()),
            },
        );
    }

    /// Drops an outstanding transaction, e.g. once its response has been
    /// processed or it has timed out for good.
    pub fn forget(&mut self, id: TransactionId) {
        self.outstanding.remove(&id);
    }

    pub fn is_outstanding(&self, id: &TransactionId) -> bool {
        self.outstanding.contains_key(id)
    }

    /// Matches `response` against its outstanding request, if any.
    pub fn match_response(&self, response: &Message, key: Option<&[u8]>) -> Option<MatchResult> {
        let outstanding = self.outstanding.get(&response.header.transaction_id)?;
        Some(match_messages(response, &outstanding.request, key))
    }

    /// Advances every outstanding transaction's retransmission timer,
    /// returning the transaction ids that should be retransmitted and
    /// those that have timed out for good (the caller is expected to
    /// `forget` the latter).
    pub fn tick(&mut self, now: Instant) -> (Vec<TransactionId>, Vec<TransactionId>) {
        let mut retransmit = Vec::new();
        let mut timed_out = Vec::new();
        for (id, outstanding) in self.outstanding.iter_mut() {
            match outstanding.timer.refresh(now) {
                crate::timer::Refresh::Ok => {}
                crate::timer::Refresh::Retransmit => retransmit.push(*id),
                crate::timer::Refresh::Timeout => timed_out.push(*id),
            }
        }
        for id in &timed_out {
            self.outstanding.remove(id);
        }
        (retransmit, timed_out)
    }

    pub fn outstanding_request(&self, id: &TransactionId) -> Option<&Message> {
        self.outstanding.get(id).map(|o| &o.request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;

    #[test]
    fn tracks_and_forgets_outstanding_requests() {
        let mut agent = Agent::new(Compatibility::Rfc5389, Usage::IgnoreCredentials);
        let request = agent.init_request(Method::Binding);
        let id = request.header.transaction_id;
        assert!(agent.is_outstanding(&id));
        agent.forget(id);
        assert!(!agent.is_outstanding(&id));
    }

    #[test]
    fn matches_response_to_outstanding_request() {
        let mut agent = Agent::new(Compatibility::Rfc5389, Usage::IgnoreCredentials);
        let request = agent.init_request(Method::Binding);
        let response = agent.init_response(&request);
        assert_eq!(
            agent.match_response(&response, None),
            Some(MatchResult::Matched)
        );
    }

    #[test]
    fn unmatched_response_without_outstanding_request() {
        let agent = Agent::new(Compatibility::Rfc5389, Usage::IgnoreCredentials);
        let request = Message::build_request(Method::Binding);
        let response = Message::build_response(&request);
        assert_eq!(
            agent.validate(&response, None),
            ValidationStatus::UnmatchedResponse
        );
    }

    #[test]
    fn ignore_credentials_usage_skips_auth() {
        let agent = Agent::new(Compatibility::Rfc5389, Usage::IgnoreCredentials);
        let request = Message::build_request(Method::Binding);
        assert_eq!(agent.validate(&request, None), ValidationStatus::Success);
    }

    #[test]
    fn long_term_usage_requires_key() {
        let agent = Agent::new(Compatibility::Rfc5389, Usage::LongTerm);
        let request = Message::build_request(Method::Allocate);
        assert_eq!(
            agent.validate(&request, None),
            ValidationStatus::Unauthorized
        );
    }
}
