//! Identity resolution for booking requests.
//!
//! Registered callers are used as-is. Guests are resolved-or-created by
//! contact email inside the caller's unit of work, so account creation
//! commits or aborts together with the booking it belongs to.

use crate::error::{Error, Result};
use crate::store::StoreData;
use crate::types::{Account, AccountId, BookingIdentity, GUEST_PLACEHOLDER_CREDENTIAL};

/// Resolves the request identity to an account id.
///
/// Guest flow: reuse the account whose email matches, updating its
/// phone if it changed; otherwise create a guest account carrying the
/// constant placeholder credential.
///
/// # Errors
///
/// Returns [`Error::Validation`] for an unknown registered account id.
/// Guest contact shape is validated by the caller before the unit of
/// work begins.
pub fn resolve(data: &mut StoreData, identity: &BookingIdentity) -> Result<AccountId> {
    match identity {
        BookingIdentity::Registered(account_id) => {
            if data.accounts.contains_key(account_id) {
                Ok(*account_id)
            } else {
                Err(Error::Validation(format!("unknown account {account_id}")))
            }
        }
        BookingIdentity::Guest(contact) => {
            if let Some(existing) = data.account_by_email(&contact.email).map(|a| a.id) {
                let account = data
                    .accounts
                    .get_mut(&existing)
                    .ok_or_else(|| Error::Internal("account index out of sync".to_string()))?;
                if account.phone != contact.phone {
                    account.phone = contact.phone.clone();
                }
                return Ok(existing);
            }

            let account = Account {
                id: AccountId::new(),
                name: contact.name.clone(),
                email: contact.email.clone(),
                phone: contact.phone.clone(),
                credential: GUEST_PLACEHOLDER_CREDENTIAL.to_string(),
                is_guest: true,
            };
            let id = account.id;
            tracing::debug!(account_id = %id, "created guest account");
            data.accounts.insert(id, account);
            Ok(id)
        }
    }
}
