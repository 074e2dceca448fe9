//! # Fee Settlement
//!
//! Credits the fees collected in one block to each currency's fee receiver.
//! A receiver without a balance in the currency gets one; currencies whose
//! policy names no receiver are skipped.

use super::{OperationProcessor, ProcessorContext, ProcessorPools, Recycle};
use crate::domain::operations::{FeeOperation, Operation, OperationHint};
use crate::domain::state::StateDelta;
use crate::errors::{OperationError, PreconditionError};
use crate::ports::{CurrencyPolicies, StateReader, StateWriter};
use shared_types::{balance_state_key, Amount, BalanceState};
use std::sync::Arc;
use tracing::{debug, info};

const HINT: OperationHint = OperationHint::Fee;

/// Processor of the block fee settlement.
#[derive(Default)]
pub struct FeeOperationProcessor {
    operation: Option<FeeOperation>,
    policies: Option<Arc<dyn CurrencyPolicies>>,
    credits: Vec<BalanceState>,
}

/// Builds a fee processor from the pools.
pub fn new_fee_processor(
    operation: &Operation,
    context: &ProcessorContext,
) -> Result<Box<dyn OperationProcessor>, OperationError> {
    let Operation::Fee(operation) = operation else {
        return Err(OperationError::UnsupportedOperation(operation.hint()));
    };

    let mut processor = context.pools.fee.acquire();
    processor.operation = Some(operation.clone());
    processor.policies = context.policies.clone();
    Ok(processor)
}

impl OperationProcessor for FeeOperationProcessor {
    fn hint(&self) -> OperationHint {
        HINT
    }

    fn pre_process(&mut self, reader: &dyn StateReader) -> Result<(), OperationError> {
        let operation = self
            .operation
            .as_ref()
            .ok_or(OperationError::NotInitialized(HINT))?;
        let Some(policies) = self.policies.as_deref() else {
            return Ok(());
        };

        for (currency, amount) in operation.amounts() {
            let feeer = policies
                .feeer(currency)
                .ok_or_else(|| PreconditionError::UnknownCurrency(currency.clone()))?;
            let Some(receiver) = feeer.receiver() else {
                debug!(currency = %currency, "no fee receiver, skipping settlement");
                continue;
            };

            let key = balance_state_key(receiver, currency);
            let current = match reader.get(&key)? {
                Some(value) => value.into_balance(&key)?,
                None => BalanceState::new(receiver.clone(), currency.clone(), Amount::zero()),
            };
            let credited = current.for_update().checked_add(*amount).ok_or_else(|| {
                PreconditionError::BalanceOverflow {
                    holder: receiver.clone(),
                    currency: currency.clone(),
                }
            })?;
            self.credits.push(credited);
        }
        Ok(())
    }

    fn process(
        &mut self,
        _reader: &dyn StateReader,
        writer: &dyn StateWriter,
    ) -> Result<(), OperationError> {
        let operation = self
            .operation
            .as_ref()
            .ok_or(OperationError::NotInitialized(HINT))?;

        let deltas: Vec<StateDelta> = self
            .credits
            .iter()
            .cloned()
            .map(StateDelta::balance)
            .collect();
        writer.set(operation.hash(), deltas)?;
        info!(
            operation = %operation.hash(),
            height = operation.height(),
            receivers = self.credits.len(),
            "block fees settled"
        );
        Ok(())
    }

    fn close(self: Box<Self>, pools: &ProcessorPools) {
        pools.fee.release(self);
    }
}

impl Recycle for FeeOperationProcessor {
    fn recycle(&mut self) {
        self.operation = None;
        self.policies = None;
        self.credits.clear();
    }
}
