use crate::types::push::PermissionState;

pub trait NotificationPlatform {
    /// Whether the platform exposes notifications and push at all.
    fn is_supported(&self) -> bool;

    fn current_permission(&self) -> PermissionState;

    /// Shows the consent prompt and resolves once the user answers or the
    /// platform auto-denies.
    fn request_permission(&self) -> impl Future<Output = PermissionState>;
}
