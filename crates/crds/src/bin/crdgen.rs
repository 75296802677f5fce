//! Prints the tenantnet CRD manifests as YAML
//!
//! Usage: `cargo run -p crds --bin crdgen > deploy/crds.yaml`

use crds::Tenant;
use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    print!("{}", serde_yaml::to_string(&Tenant::crd())?);
    Ok(())
}
