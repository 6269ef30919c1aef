use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Источник признака "есть сеть"
pub trait Connectivity {
    fn is_online(&self) -> bool;
}

/// Снимает подписку при удалении
struct ListenerGuard {
    detach: Option<Box<dyn FnOnce()>>,
}

impl ListenerGuard {
    fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

/// `navigator.onLine` плюс события `online`/`offline` окна.
/// Слушатели снимаются вместе с последней ссылкой на значение.
pub struct BrowserConnectivity {
    online: Rc<Cell<bool>>,
    _listeners: Vec<ListenerGuard>,
}

impl BrowserConnectivity {
    /// `on_change` вызывается при каждом переходе online/offline
    pub fn new(on_change: impl Fn(bool) + 'static) -> Self {
        let window = web_sys::window();
        let online = Rc::new(Cell::new(
            window.as_ref().map(|w| w.navigator().on_line()).unwrap_or(true),
        ));
        let mut listeners = Vec::new();

        if let Some(window) = window {
            let on_change = Rc::new(on_change);
            for (event, value) in [("online", true), ("offline", false)] {
                let flag = online.clone();
                let on_change = on_change.clone();
                let handler = Closure::wrap(Box::new(move |_: web_sys::Event| {
                    flag.set(value);
                    on_change(value);
                }) as Box<dyn FnMut(web_sys::Event)>);

                if window
                    .add_event_listener_with_callback(event, handler.as_ref().unchecked_ref())
                    .is_err()
                {
                    log::warn!("Failed to subscribe to '{}' events", event);
                    continue;
                }

                let window = window.clone();
                listeners.push(ListenerGuard::new(move || {
                    if window
                        .remove_event_listener_with_callback(event, handler.as_ref().unchecked_ref())
                        .is_err()
                    {
                        log::warn!("Failed to unsubscribe from '{}' events", event);
                    }
                }));
            }
        }

        Self {
            online,
            _listeners: listeners,
        }
    }
}

impl Connectivity for BrowserConnectivity {
    fn is_online(&self) -> bool {
        self.online.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_detaches_once_on_drop() {
        let detached = Rc::new(Cell::new(0));
        let counter = detached.clone();
        let guards = vec![ListenerGuard::new(move || counter.set(counter.get() + 1))];
        assert_eq!(detached.get(), 0);

        drop(guards);
        assert_eq!(detached.get(), 1);
    }
}
