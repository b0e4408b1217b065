//! Signed transactions.
//!
//! ```text
//! Transaction {
//!   sender    : [u8; 32]      // Ed25519 public key
//!   nonce     : u64           // Sender's next expected nonce
//!   call      : CallMessage   // What change to make
//!   signature : Signature     // Over CBOR(sender, nonce, call)
//! }
//! ```

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::hash::to_cbor;
use crate::{CallMessage, Error, Hash, Identity};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender's Ed25519 public key.
    pub sender: [u8; 32],

    pub nonce: u64,

    pub call: CallMessage,

    /// Ed25519 signature over the signable content.
    pub signature: Vec<u8>,
}

/// Helper struct for signing (excludes the signature).
#[derive(Serialize)]
struct SignableTransaction<'a> {
    sender: &'a [u8; 32],
    nonce: u64,
    call: &'a CallMessage,
}

impl Transaction {
    /// Build and sign a transaction.
    pub fn new(call: CallMessage, nonce: u64, signing_key: &SigningKey) -> Result<Self, Error> {
        let mut tx = Self {
            sender: signing_key.verifying_key().to_bytes(),
            nonce,
            call,
            signature: Vec::new(),
        };
        let signature = signing_key.sign(&tx.signable_content()?);
        tx.signature = signature.to_bytes().to_vec();
        Ok(tx)
    }

    fn signable_content(&self) -> Result<Vec<u8>, Error> {
        to_cbor(&SignableTransaction {
            sender: &self.sender,
            nonce: self.nonce,
            call: &self.call,
        })
    }

    /// Content hash of the signed body.
    pub fn id(&self) -> Result<Hash, Error> {
        Ok(Hash::of(&self.signable_content()?))
    }

    pub fn sender_identity(&self) -> Identity {
        Identity::from_key_bytes(&self.sender)
    }

    /// Check the signature against the embedded sender key.
    pub fn verify(&self) -> Result<(), Error> {
        let invalid = || Error::InvalidSignature(self.sender_identity());

        let public_key = VerifyingKey::from_bytes(&self.sender).map_err(|_| invalid())?;
        let signature = Signature::from_slice(&self.signature).map_err(|_| invalid())?;
        public_key
            .verify(&self.signable_content()?, &signature)
            .map_err(|_| invalid())
    }
}
