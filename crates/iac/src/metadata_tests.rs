// SPDX-License-Identifier: MIT

use super::*;
use tempfile::tempdir;

#[test]
fn missing_metadata_reads_as_default() {
    let dir = tempdir().unwrap();
    let metadata = read(dir.path());
    assert!(metadata.template_hash.is_none());
}

#[test]
fn write_then_read_round_trips() {
    let dir = tempdir().unwrap();
    let metadata = ProvisionerMetadata { template: Some("standard-vm".to_string()), template_hash: Some("abc123".to_string()), last_deployed_epoch_ms: Some(42) };
    write(dir.path(), &metadata).unwrap();
    let reread = read(dir.path());
    assert_eq!(reread.template_hash.as_deref(), Some("abc123"));
    assert_eq!(reread.last_deployed_epoch_ms, Some(42));
}
