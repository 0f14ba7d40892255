//! 96-bit transaction id generation.
//!
//! Mirrors libnice's `stun_generate_transaction_id` usage: a monotonic
//! counter run through HMAC-SHA1 under a process-local secret, so ids
//! are unpredictable without needing a full CSPRNG draw per message.

use hmac::{Hmac, Mac, NewMac};
use lazy_static::lazy_static;
use rand::RngCore;
use sha1::Sha1;
use std::fmt;
use std::sync::Mutex;

type HmacSha1 = Hmac<Sha1>;

const ID_LEN: usize = 12;

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct TransactionId([u8; ID_LEN]);

impl TransactionId {
    pub fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        TransactionId(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Draws a fresh id from the process-wide generator.
    pub fn generate() -> Self {
        GENERATOR.lock().unwrap().next_id()
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId(")?;
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

struct Generator {
    secret: [u8; 20],
    counter: u64,
}

impl Generator {
    fn new() -> Self {
        let mut secret = [0u8; 20];
        rand::thread_rng().fill_bytes(&mut secret);
        Generator { secret, counter: 0 }
    }

    fn next_id(&mut self) -> TransactionId {
        let (next, overflowed) = self.counter.overflowing_add(1);
        self.counter = next;
        if overflowed {
            rand::thread_rng().fill_bytes(&mut self.secret);
        }

        let mut mac = HmacSha1::new_varkey(&self.secret).expect("hmac accepts any key length");
        mac.update(&self.counter.to_be_bytes());
        let digest = mac.finalize().into_bytes();

        let mut id = [0u8; ID_LEN];
        id.copy_from_slice(&digest[..ID_LEN]);
        TransactionId(id)
    }
}

lazy_static! {
    static ref GENERATOR: Mutex<Generator> = Mutex::new(Generator::new());
}
