/// UI prompt surface the core needs from its host application.
///
/// Implemented by the wallet frontend; passed to plugins when opening a
/// session and owned by each hardware keystore.
pub trait Handler: Send + Sync {
    /// Surface an error message to the user.
    fn show_error(&self, message: &str);
}
