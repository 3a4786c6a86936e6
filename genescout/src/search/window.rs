use memchr::memmem::Finder;
use std::fs::File;
use std::io;
use tracing::trace;

use super::partition::Window;

/// Reads up to `buf.len()` bytes at `offset` without touching the file
/// cursor, so many threads can read the same handle at once.
///
/// Returns the number of bytes read, which is only short of `buf.len()`
/// when the end of the file was reached.
pub fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match read_at_once(file, &mut buf[filled..], offset + filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(unix)]
fn read_at_once(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn read_at_once(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

/// Scans a single window of `file` for `needle`, using `buf` as scratch
/// space. `buf` must be at least `window.len` bytes long.
pub fn scan_window(
    file: &File,
    window: Window,
    buf: &mut [u8],
    needle: &Finder<'_>,
) -> io::Result<(bool, usize)> {
    let n = read_at(file, &mut buf[..window.len], window.offset)?;
    let found = needle.find(&buf[..n]).is_some();
    trace!(
        "Scanned window at offset {} ({} bytes): {}",
        window.offset,
        n,
        if found { "match" } else { "no match" }
    );
    Ok((found, n))
}
