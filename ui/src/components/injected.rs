//! Binding to the wallet the browser extension injects as `window.ethereum`.

// ─── WASM implementation ────────────────────────────────────────────────────

#[cfg(target_family = "wasm")]
mod wasm_impl {
    use alloy_primitives::Address;
    use js_sys::{Function, Object, Promise, Reflect};
    use serde::Serialize;
    use serde_json::Value;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    use coffee_common::provider::{ProviderError, WalletProvider, INTERNAL_ERROR};

    #[derive(Clone)]
    pub struct InjectedProvider {
        ethereum: JsValue,
        name: String,
    }

    impl InjectedProvider {
        pub fn detect() -> Option<Self> {
            let window = web_sys::window()?;
            let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
            if ethereum.is_undefined() || ethereum.is_null() {
                return None;
            }
            let is_metamask = Reflect::get(&ethereum, &JsValue::from_str("isMetaMask"))
                .ok()
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            let name = if is_metamask { "MetaMask" } else { "injected" };
            Some(Self {
                ethereum,
                name: name.to_string(),
            })
        }

        /// Register `handler` for the wallet's `accountsChanged` event. The
        /// listener lives for the rest of the page.
        pub fn on_accounts_changed(&self, mut handler: impl FnMut(Vec<Address>) + 'static) {
            let on = Reflect::get(&self.ethereum, &JsValue::from_str("on"))
                .ok()
                .and_then(|f| f.dyn_into::<Function>().ok());
            let Some(on) = on else {
                tracing::warn!("{} has no event API; account changes will be missed", self.name);
                return;
            };

            let listener = Closure::<dyn FnMut(JsValue)>::new(move |accounts: JsValue| {
                match serde_wasm_bindgen::from_value::<Vec<Address>>(accounts) {
                    Ok(accounts) => handler(accounts),
                    Err(e) => tracing::warn!("Ignoring malformed accountsChanged payload: {e}"),
                }
            });
            if let Err(e) = on.call2(
                &self.ethereum,
                &JsValue::from_str("accountsChanged"),
                listener.as_ref().unchecked_ref(),
            ) {
                tracing::warn!("Failed to subscribe to accountsChanged: {:?}", e);
            }
            listener.forget();
        }
    }

    /// Read `{ code, message }` off a rejected request. `message` on a JS
    /// `Error` is not enumerable, so it is taken from the error itself.
    fn provider_error(err: JsValue) -> ProviderError {
        let mut parsed: ProviderError = serde_wasm_bindgen::from_value(err.clone())
            .unwrap_or_else(|_| ProviderError::new(INTERNAL_ERROR, String::new()));
        if parsed.message.is_empty() {
            parsed.message = err
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
                .unwrap_or_else(|| format!("{err:?}"));
        }
        parsed
    }

    fn internal(msg: impl ToString) -> ProviderError {
        ProviderError::new(INTERNAL_ERROR, msg.to_string())
    }

    impl WalletProvider for InjectedProvider {
        async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
            let params = params
                .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
                .map_err(internal)?;
            let args = Object::new();
            Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method))
                .map_err(provider_error)?;
            Reflect::set(&args, &JsValue::from_str("params"), &params).map_err(provider_error)?;

            let request: Function = Reflect::get(&self.ethereum, &JsValue::from_str("request"))
                .map_err(provider_error)?
                .dyn_into()
                .map_err(|_| internal("provider has no request()"))?;
            let promise: Promise = request
                .call1(&self.ethereum, &args)
                .map_err(provider_error)?
                .dyn_into()
                .map_err(|_| internal("request() did not return a promise"))?;

            let result = JsFuture::from(promise).await.map_err(provider_error)?;
            if result.is_undefined() {
                return Ok(Value::Null);
            }
            serde_wasm_bindgen::from_value(result).map_err(internal)
        }

        async fn sleep(&self, millis: u64) {
            let millis = u32::try_from(millis).unwrap_or(u32::MAX);
            gloo_timers::future::TimeoutFuture::new(millis).await;
        }

        fn provider_name(&self) -> &str {
            &self.name
        }
    }
}

#[cfg(target_family = "wasm")]
pub use wasm_impl::InjectedProvider;

// Non-WASM stub so the crate type-checks natively. There is never a wallet.
#[cfg(not(target_family = "wasm"))]
mod native_stub {
    use alloy_primitives::Address;
    use serde_json::Value;

    use coffee_common::provider::{ProviderError, WalletProvider, DISCONNECTED};

    #[derive(Clone)]
    pub struct InjectedProvider;

    impl InjectedProvider {
        pub fn detect() -> Option<Self> {
            tracing::warn!("Injected wallets only exist in the browser");
            None
        }

        pub fn on_accounts_changed(&self, _handler: impl FnMut(Vec<Address>) + 'static) {}
    }

    impl WalletProvider for InjectedProvider {
        async fn request(&self, method: &str, _params: Value) -> Result<Value, ProviderError> {
            Err(ProviderError::new(
                DISCONNECTED,
                format!("{method}: no injected wallet outside the browser"),
            ))
        }

        async fn sleep(&self, _millis: u64) {}

        fn provider_name(&self) -> &str {
            "none"
        }
    }
}

#[cfg(not(target_family = "wasm"))]
pub use native_stub::InjectedProvider;
