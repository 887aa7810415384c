//! Ограниченная таблица интернирования для типов значений.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

/// Общая для процесса таблица из канонических строк в разделяемые значения.
///
/// Хранит не более `capacity` записей. При заполнении вытесняется самая
/// ранняя запись, поэтому повторно разбираемые значения скорее всего, но не
/// гарантированно, разделяют одно представление.
#[derive(Debug)]
pub struct ValueCache<V> {
    capacity: usize,
    state: Mutex<CacheState<V>>,
}

#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<String, V>,
    order: VecDeque<String>,
}

impl<V: Clone> ValueCache<V> {
    /// Создаёт пустую таблицу не более чем на `capacity` записей.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(CacheState { entries: HashMap::new(), order: VecDeque::new() }),
        }
    }

    /// Значение из кеша по `key`; если его нет, создаёт через `make`.
    pub fn get_or_insert_with(&self, key: &str, make: impl FnOnce() -> V) -> V {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = state.entries.get(key) {
            return value.clone();
        }

        if state.entries.len() >= self.capacity
            && let Some(oldest) = state.order.pop_front()
        {
            state.entries.remove(&oldest);
        }

        let value = make();
        state.entries.insert(key.to_string(), value.clone());
        state.order.push_back(key.to_string());
        value
    }

    /// Число записей в кеше.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).entries.len()
    }

    /// Пуста ли таблица.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Удаляет все записи.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.entries.clear();
        state.order.clear();
    }
}
