// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sealing uploaded files into encrypted records.

use chrono::Utc;

use crate::crypto::{CryptoEngine, CryptoError};
use crate::storage::{EncryptedRecord, RecordMetadata, StorageError, VaultStore, RECORD_FORMAT_V1};

/// A plaintext file on its way into the vault.
pub struct FileUpload {
    pub zone_id: String,
    pub original_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("zone not found: {0}")]
    ZoneNotFound(String),

    #[error("failed to encrypt upload: {0}")]
    Encryption(#[from] CryptoError),

    #[error("failed to store upload: {0}")]
    Storage(#[from] StorageError),
}

/// Encrypt `upload` and persist it as a new record bound to its zone.
///
/// The plaintext is encrypted exactly once; the stored record is never
/// rewritten afterwards.
pub async fn seal_upload<S: VaultStore>(
    store: &S,
    crypto: &CryptoEngine,
    upload: FileUpload,
) -> Result<RecordMetadata, UploadError> {
    if store.get_zone(&upload.zone_id).await?.is_none() {
        return Err(UploadError::ZoneNotFound(upload.zone_id));
    }

    let size = upload.bytes.len() as u64;
    let payload = crypto.encrypt(&upload.bytes)?;

    let record = EncryptedRecord {
        id: uuid::Uuid::new_v4().to_string(),
        zone_id: upload.zone_id,
        format_version: RECORD_FORMAT_V1,
        ciphertext: EncryptedRecord::encode_ciphertext(payload.as_bytes()),
        mime_type: upload.mime_type,
        original_name: upload.original_name,
        size,
        created_at: Utc::now(),
    };
    let metadata = record.metadata();

    store.put_record(record).await?;

    tracing::info!(
        file_id = %metadata.id,
        zone_id = %metadata.zone_id,
        size = metadata.size,
        "Stored encrypted file"
    );

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{EncryptedPayload, EncryptionKey, PAYLOAD_OVERHEAD};
    use crate::geo::{Coordinate, Zone};
    use crate::storage::memory::InMemoryVault;

    fn engine() -> CryptoEngine {
        CryptoEngine::new(&EncryptionKey::from_bytes([3u8; 32]))
    }

    fn upload(zone_id: &str) -> FileUpload {
        FileUpload {
            zone_id: zone_id.to_string(),
            original_name: "map.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G', 1, 2, 3],
        }
    }

    #[tokio::test]
    async fn seals_and_stores_ciphertext() {
        let store = InMemoryVault::new();
        let zone = Zone::new("Lab", None, Coordinate::new(0.0, 0.0).unwrap(), 10.0, "admin")
            .unwrap();
        store.insert_zone(zone.clone()).await;
        let crypto = engine();

        let metadata = seal_upload(&store, &crypto, upload(&zone.id)).await.unwrap();
        assert_eq!(metadata.zone_id, zone.id);
        assert_eq!(metadata.size, 7);
        assert_eq!(metadata.format_version, RECORD_FORMAT_V1);

        let stored = store.get_record(&metadata.id).await.unwrap().unwrap();
        let sealed = stored.ciphertext_bytes().unwrap();
        assert_eq!(sealed.len(), 7 + PAYLOAD_OVERHEAD);
        assert_ne!(&sealed[PAYLOAD_OVERHEAD..], upload(&zone.id).bytes.as_slice());

        let plaintext = crypto
            .decrypt(&EncryptedPayload::from_bytes(sealed))
            .unwrap();
        assert_eq!(plaintext, upload(&zone.id).bytes);
    }

    #[tokio::test]
    async fn unknown_zone_is_rejected() {
        let store = InMemoryVault::new();
        let result = seal_upload(&store, &engine(), upload("ghost")).await;
        assert!(matches!(result, Err(UploadError::ZoneNotFound(ref id)) if id == "ghost"));
        assert!(store.list_records().await.unwrap().is_empty());
    }
}
