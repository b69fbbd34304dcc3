/// Callbacks the owning UI layer receives from the orchestrator.
///
/// `on_success` and `on_error` each fire at most once per orchestrator (or
/// confirmation flow) instance; `set_message` carries transient status text
/// and `None` clears it.
pub trait CheckoutEvents: Send + Sync {
    fn on_success(&self);

    fn on_error(&self, message: &str);

    fn set_message(&self, message: Option<&str>);
}
