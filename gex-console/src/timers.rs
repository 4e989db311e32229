//! Minuteries d'un contrôleur : intervalles de polling, délais (toasts) et
//! tâches de fond. Tout est annulé par `clear()` et au drop.

use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};

/// Poignée vers une minuterie précise (annulation individuelle)
#[derive(Debug, Clone)]
pub struct TimerHandle(AbortHandle);

impl TimerHandle {
    pub fn cancel(&self) {
        self.0.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

#[derive(Default)]
pub struct TimerSet {
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appelle `tick` toutes les `period`, premier appel après une période
    pub fn every<F, Fut>(&self, period: Duration, mut tick: F) -> TimerHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tick().await;
            }
        })
    }

    pub fn after<Fut>(&self, delay: Duration, fut: Fut) -> TimerHandle
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.spawn(async move {
            time::sleep(delay).await;
            fut.await;
        })
    }

    pub fn spawn<Fut>(&self, fut: Fut) -> TimerHandle
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task = tokio::spawn(fut);
        let handle = TimerHandle(task.abort_handle());
        let mut tasks = self.tasks.lock();
        tasks.retain(|t| !t.is_finished());
        tasks.push(task);
        handle
    }

    /// Annule toutes les minuteries encore actives
    pub fn clear(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }

    /// Nombre de minuteries encore actives
    pub fn len(&self) -> usize {
        self.tasks.lock().iter().filter(|t| !t.is_finished()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.clear();
    }
}
