use async_trait::async_trait;
use gloo_timers::future::TimeoutFuture;

/// Асинхронная задержка (для тестов подменяется мгновенной)
#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, millis: u32);
}

pub struct BrowserTimer;

#[async_trait(?Send)]
impl Timer for BrowserTimer {
    async fn sleep(&self, millis: u32) {
        TimeoutFuture::new(millis).await;
    }
}
