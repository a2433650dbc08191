//! Error helpers shared by all tavola crates.
//!
//! Mostly about rendering an error together with its whole `source()` chain
//! on a single line, which is what we want in structured log fields.

use std::{error, fmt, iter};

pub type WhateverResult<T> = std::result::Result<T, snafu::Whatever>;

/// Iterate over an error and all its sources, outermost first.
pub fn error_chain<'e>(
    err: &'e (dyn error::Error + 'static),
) -> impl Iterator<Item = &'e (dyn error::Error + 'static)> {
    iter::successors(Some(err), |e| e.source())
}

/// Displays `err: source: source-of-source...`
pub struct CompactError<'e>(&'e (dyn error::Error + 'static));

impl fmt::Display for CompactError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prev: Option<String> = None;
        for (i, err) in error_chain(self.0).enumerate() {
            let msg = err.to_string();
            // snafu's `transparent` variants repeat the source message
            if prev.as_deref() == Some(msg.as_str()) {
                continue;
            }
            if 0 < i {
                f.write_str(": ")?;
            }
            f.write_str(&msg)?;
            prev = Some(msg);
        }
        Ok(())
    }
}

pub trait FmtCompact {
    fn fmt_compact(&self) -> CompactError<'_>;
}

impl<E> FmtCompact for E
where
    E: error::Error + 'static,
{
    fn fmt_compact(&self) -> CompactError<'_> {
        CompactError(self)
    }
}

#[cfg(test)]
mod tests {
    use snafu::{ResultExt as _, Snafu};

    use super::*;

    #[derive(Debug, Snafu)]
    #[snafu(display("disk on fire"))]
    struct Inner;

    #[derive(Debug, Snafu)]
    enum Outer {
        #[snafu(display("saving order"))]
        Save { source: Inner },
        #[snafu(transparent)]
        Passthrough { source: Inner },
    }

    #[test]
    fn compact_joins_whole_chain() {
        let err = Err::<(), _>(Inner).context(SaveSnafu).unwrap_err();
        assert_eq!(err.fmt_compact().to_string(), "saving order: disk on fire");
    }

    #[test]
    fn compact_skips_repeated_transparent_message() {
        let err = Outer::from(Inner);
        assert_eq!(err.fmt_compact().to_string(), "disk on fire");
    }

    #[test]
    fn chain_counts_every_source() {
        let err = Err::<(), _>(Inner).context(SaveSnafu).unwrap_err();
        assert_eq!(error_chain(&err).count(), 2);
    }
}
