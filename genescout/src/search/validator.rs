use crate::errors::ValidationError;

/// Literal every gene sequence must start with
pub const GENE_PREFIX: &str = "AAAAAAAAAAA";

/// Bases allowed after the prefix
pub const LEGAL_BASES: &[u8] = b"AGCT";

/// Checks that `gene` is a well-formed gene template.
///
/// The prefix check runs first so an empty sequence is reported as a
/// missing prefix. Matching is case-sensitive; lower-case bases are illegal.
pub fn validate_template(gene: &str) -> Result<(), ValidationError> {
    let Some(bases) = gene.strip_prefix(GENE_PREFIX) else {
        return Err(ValidationError::MissingPrefix);
    };

    if bases.bytes().all(|b| LEGAL_BASES.contains(&b)) {
        Ok(())
    } else {
        Err(ValidationError::InvalidTemplate)
    }
}

/// Checks that a gene of `gene_len` bytes can fit in a file of `file_len` bytes
pub fn validate_fits(gene_len: usize, file_len: u64) -> Result<(), ValidationError> {
    if gene_len as u64 > file_len {
        return Err(ValidationError::LargerThanFile);
    }
    Ok(())
}
