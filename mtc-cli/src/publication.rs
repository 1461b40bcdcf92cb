//! On-disk publication layout, rooted at `IssuerConfig::batches_root`:
//!
//! ```text
//! <root>/<b>/signed-validity-window
//! <root>/<b>/tree
//! <root>/<b>/assertions
//! <root>/latest
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use mtc_core::assertion::Assertions;
use mtc_core::codec::Codec;
use mtc_core::window::SignedValidityWindow;

/// Directory holding one batch's published artifacts.
pub fn batch_dir(root: &Path, batch_number: u32) -> PathBuf {
    root.join(batch_number.to_string())
}

fn latest_path(root: &Path) -> PathBuf {
    root.join("latest")
}

/// Read the newest published batch number, if any batch has been issued.
pub fn read_latest(root: &Path) -> anyhow::Result<Option<u32>> {
    let path = latest_path(root);
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    Ok(Some(text.trim().parse()?))
}

/// Record `batch_number` as the newest published batch.
pub fn write_latest(root: &Path, batch_number: u32) -> anyhow::Result<()> {
    fs::write(latest_path(root), batch_number.to_string())?;
    Ok(())
}

/// Load the signed validity window last published for `batch_number`.
pub fn read_signed_window(root: &Path, batch_number: u32) -> anyhow::Result<SignedValidityWindow> {
    let bytes = fs::read(batch_dir(root, batch_number).join("signed-validity-window"))?;
    let (window, _) = SignedValidityWindow::parse(&bytes)?;
    Ok(window)
}

/// Publish `signed_window` and `assertions` under `batch_number`,
/// recording it as the latest batch.
pub fn write_batch(
    root: &Path,
    batch_number: u32,
    signed_window: &SignedValidityWindow,
    assertions: &Assertions,
) -> anyhow::Result<()> {
    let dir = batch_dir(root, batch_number);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("signed-validity-window"), signed_window.to_bytes())?;
    fs::write(dir.join("tree"), signed_window.window.tree_heads.0.last().unwrap())?;
    fs::write(dir.join("assertions"), assertions.to_bytes())?;
    write_latest(root, batch_number)?;
    Ok(())
}

/// Load the assertions published for `batch_number`, to rebuild its
/// node table for `certify`.
pub fn read_assertions(root: &Path, batch_number: u32) -> anyhow::Result<Assertions> {
    let bytes = fs::read(batch_dir(root, batch_number).join("assertions"))?;
    let (assertions, _) = Assertions::parse(&bytes)?;
    Ok(assertions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtc_core::assertion::{Assertion, ClaimList, SubjectInfo, SubjectType};
    use mtc_core::window::ValidityWindow;
    use tempfile::tempdir;

    #[test]
    fn writes_and_reads_batch_round_trip() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        let assertion = Assertion {
            subject_type: SubjectType::Tls,
            subject_info: SubjectInfo::new(vec![]),
            claims: ClaimList::new(vec![]),
        };
        let assertions = Assertions(vec![assertion]);
        let window = ValidityWindow::rotate(None, 0, [1u8; 32], 1).unwrap();
        let signing_key = ed25519_dalek::SigningKey::from_bytes(&[2u8; 32]);
        let signed_window = SignedValidityWindow::sign(b"issuer".to_vec(), window, &signing_key);

        write_batch(root, 0, &signed_window, &assertions).unwrap();

        assert_eq!(read_latest(root).unwrap(), Some(0));
        let loaded_window = read_signed_window(root, 0).unwrap();
        assert_eq!(loaded_window, signed_window);
        let loaded_assertions = read_assertions(root, 0).unwrap();
        assert_eq!(loaded_assertions, assertions);
    }
}
