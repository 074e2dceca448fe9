//! # Processor Pools
//!
//! Free-lists of processor instances reused across operations and blocks.
//! Every instance is recycled to its zero state before it goes back on a
//! free-list, so nothing staged for one operation can reach the next.

use super::create::{CreateDocumentsItemProcessor, CreateDocumentsProcessor};
use super::fee::FeeOperationProcessor;
use super::sign::{SignDocumentsItemProcessor, SignDocumentsProcessor};
use super::transfer::{TransferDocumentsItemProcessor, TransferDocumentsProcessor};
use super::update::{UpdateDocumentsItemProcessor, UpdateDocumentsProcessor};
use parking_lot::Mutex;

/// Resets an instance to its zero state.
pub trait Recycle {
    fn recycle(&mut self);
}

/// Bounded free-list of boxed instances.
pub struct ObjectPool<T> {
    idle: Mutex<Vec<Box<T>>>,
    capacity: usize,
}

impl<T: Default + Recycle> ObjectPool<T> {
    /// Pool keeping at most `capacity` idle instances.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Takes an idle instance, or allocates a fresh one.
    pub fn acquire(&self) -> Box<T> {
        self.idle.lock().pop().unwrap_or_default()
    }

    /// Recycles `item` and keeps it if the pool has room.
    pub fn release(&self, mut item: Box<T>) {
        item.recycle();
        let mut idle = self.idle.lock();
        if idle.len() < self.capacity {
            idle.push(item);
        }
    }

    /// Number of idle instances.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }
}

/// One pool per processor type.
pub struct ProcessorPools {
    pub create: ObjectPool<CreateDocumentsProcessor>,
    pub create_items: ObjectPool<CreateDocumentsItemProcessor>,
    pub sign: ObjectPool<SignDocumentsProcessor>,
    pub sign_items: ObjectPool<SignDocumentsItemProcessor>,
    pub update: ObjectPool<UpdateDocumentsProcessor>,
    pub update_items: ObjectPool<UpdateDocumentsItemProcessor>,
    pub transfer: ObjectPool<TransferDocumentsProcessor>,
    pub transfer_items: ObjectPool<TransferDocumentsItemProcessor>,
    pub fee: ObjectPool<FeeOperationProcessor>,
}

impl ProcessorPools {
    /// Pools keeping at most `capacity` idle instances each.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            create: ObjectPool::new(capacity),
            create_items: ObjectPool::new(capacity),
            sign: ObjectPool::new(capacity),
            sign_items: ObjectPool::new(capacity),
            update: ObjectPool::new(capacity),
            update_items: ObjectPool::new(capacity),
            transfer: ObjectPool::new(capacity),
            transfer_items: ObjectPool::new(capacity),
            fee: ObjectPool::new(capacity),
        }
    }
}
