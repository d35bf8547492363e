use crate::error::Result;
use crate::models::{AdminDefaults, ProvisionOutcome};

/// The slice of the external account subsystem the provisioner needs: one
/// query and one mutation.
pub trait AccountDirectory {
    fn count_privileged(&self) -> impl std::future::Future<Output = Result<u64>> + Send;
    fn create_privileged(
        &self,
        defaults: &AdminDefaults,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Ensure exactly one privileged account exists.
///
/// Creation is requested only when the directory reports zero privileged
/// accounts; any pre-existing account, matching the defaults or not, makes
/// this a no-op. At most one creation call is ever issued per run.
pub async fn ensure_privileged_account<D: AccountDirectory>(
    directory: &D,
    defaults: &AdminDefaults,
) -> Result<ProvisionOutcome> {
    let existing = directory.count_privileged().await?;
    if existing > 0 {
        tracing::info!(existing, "privileged account present, skipping creation");
        return Ok(ProvisionOutcome::AlreadyExists);
    }

    directory.create_privileged(defaults).await?;
    // Operator-facing notice, intended for disposable dev environments where
    // the default credentials are the whole point.
    println!(
        "Created default privileged account: login '{}' password '{}'",
        defaults.username, defaults.password
    );
    Ok(ProvisionOutcome::Created)
}
