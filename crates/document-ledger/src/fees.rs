//! # Fee Engine
//!
//! Computes what an operation owes per currency and checks the sender can
//! pay it.
//!
//! Every item contributes the fee its currency policy charges on a zero base
//! amount. Items sharing a currency accumulate, each adding its own fee.
//! A requirement entry exists for every currency named by an item, even when
//! the fee is zero, so the balance check still demands the balance exists.
//!
//! Without a policy lookup every requirement is zero.

use crate::domain::state::StateDelta;
use crate::errors::{OperationError, PreconditionError};
use crate::ports::{CurrencyPolicies, StateReader};
use shared_types::{balance_state_key, Address, Amount, BalanceState, CurrencyId};
use std::collections::BTreeMap;

/// What one currency costs an operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeRequirement {
    /// Removed from the sender balance.
    pub debit: Amount,
    /// Credited to the block fee pool.
    pub fee: Amount,
}

/// Requirements keyed by currency, in currency order.
pub type FeeRequirements = BTreeMap<CurrencyId, FeeRequirement>;

/// Sums the fees of items paying in `currencies`.
pub fn calculate_item_fees<'a, I>(
    policies: Option<&dyn CurrencyPolicies>,
    currencies: I,
) -> Result<FeeRequirements, PreconditionError>
where
    I: IntoIterator<Item = &'a CurrencyId>,
{
    let mut required = FeeRequirements::new();
    for currency in currencies {
        let entry = required.entry(currency.clone()).or_default();
        let Some(policies) = policies else {
            continue;
        };
        let feeer = policies
            .feeer(currency)
            .ok_or_else(|| PreconditionError::UnknownCurrency(currency.clone()))?;
        let fee = feeer
            .fee(Amount::zero())
            .map_err(|e| PreconditionError::FeePolicy {
                currency: currency.clone(),
                reason: e.reason,
            })?;
        if fee.is_zero() {
            continue;
        }
        let (Some(debit), Some(total)) = (entry.debit.checked_add(fee), entry.fee.checked_add(fee))
        else {
            return Err(PreconditionError::FeePolicy {
                currency: currency.clone(),
                reason: "fee overflow".to_string(),
            });
        };
        entry.debit = debit;
        entry.fee = total;
    }
    Ok(required)
}

/// Checks `holder` can cover every requirement.
///
/// Returns the balances, prepared for update, keyed by currency.
pub fn check_enough_balance(
    holder: &Address,
    required: &FeeRequirements,
    reader: &dyn StateReader,
) -> Result<BTreeMap<CurrencyId, BalanceState>, OperationError> {
    let mut balances = BTreeMap::new();
    for (currency, requirement) in required {
        let key = balance_state_key(holder, currency);
        let balance = reader
            .get(&key)?
            .ok_or_else(|| PreconditionError::BalanceNotFound {
                holder: holder.clone(),
                currency: currency.clone(),
            })?
            .into_balance(&key)?;
        if balance.amount < requirement.debit {
            return Err(PreconditionError::InsufficientBalance {
                holder: holder.clone(),
                currency: currency.clone(),
                required: requirement.debit,
                available: balance.amount,
            }
            .into());
        }
        balances.insert(currency.clone(), balance.for_update());
    }
    Ok(balances)
}

/// One debit delta per requirement: `balance - debit`, recording `fee`.
pub fn fee_deltas(
    holder: &Address,
    balances: &BTreeMap<CurrencyId, BalanceState>,
    required: &FeeRequirements,
) -> Result<Vec<StateDelta>, PreconditionError> {
    let mut deltas = Vec::with_capacity(required.len());
    for (currency, requirement) in required {
        let balance = balances
            .get(currency)
            .ok_or_else(|| PreconditionError::BalanceNotFound {
                holder: holder.clone(),
                currency: currency.clone(),
            })?;
        let debited = balance.checked_sub(requirement.debit).ok_or_else(|| {
            PreconditionError::InsufficientBalance {
                holder: holder.clone(),
                currency: currency.clone(),
                required: requirement.debit,
                available: balance.amount,
            }
        })?;
        deltas.push(StateDelta::balance(debited.add_fee(requirement.fee)));
    }
    Ok(deltas)
}
