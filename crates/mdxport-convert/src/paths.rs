//! Path and identifier derivation.
//!
//! All paths handled here are slash-separated and relative to the output
//! root, regardless of the platform the converter runs on.

/// Computes a relative path from one output file to another (RFC 3986).
///
/// The last segment of `from` is the current document, so the base directory
/// is everything before it. A trailing slash means the document part is
/// empty and all of `from` is the directory.
///
/// # Examples
///
/// ```
/// use mdxport_convert::relative_path;
///
/// assert_eq!(relative_path("a/b.mdx", "a/c.mdx"), "c.mdx");
/// assert_eq!(relative_path("page.mdx", "includes/steps.mdx"), "includes/steps.mdx");
/// assert_eq!(relative_path("guide/page.mdx", "refs.js"), "../refs.js");
/// ```
#[must_use]
pub fn relative_path(from: &str, to: &str) -> String {
    let from_segs: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_segs: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let from_dir = if from.ends_with('/') || from_segs.is_empty() {
        &from_segs[..]
    } else {
        &from_segs[..from_segs.len() - 1]
    };

    let common = from_dir
        .iter()
        .zip(&to_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = from_dir.len() - common;
    let remaining = &to_segs[common..];

    let ups_part = "../".repeat(ups);
    let down_part = remaining.join("/");

    let result = format!("{ups_part}{down_part}");
    if result.is_empty() {
        "./".to_owned()
    } else {
        result
    }
}

/// Computes an ESM import specifier from one output file to another.
///
/// Same as [`relative_path`], but guarantees the leading `./` bundlers
/// require on same-directory and descendant specifiers.
#[must_use]
pub fn import_specifier(from: &str, to: &str) -> String {
    let relative = relative_path(from, to);
    if relative.starts_with("../") || relative.starts_with("./") {
        relative
    } else {
        format!("./{relative}")
    }
}

/// Derives a JSX component name from a directive name or file stem.
///
/// Splits on any non-alphanumeric character and capitalizes each piece:
/// `list-table` becomes `ListTable`, `steps_run` becomes `StepsRun`.
#[must_use]
pub fn component_name(raw: &str) -> String {
    raw.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|segment| !segment.is_empty())
        .map(capitalize)
        .collect()
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Derives a JavaScript identifier for an imported image from its file name.
///
/// The extension is dropped, anything outside `[A-Za-z0-9_]` becomes an
/// underscore, a leading digit gains an underscore prefix and the result is
/// suffixed with `Img`.
///
/// # Examples
///
/// ```
/// use mdxport_convert::asset_identifier;
///
/// assert_eq!(asset_identifier("compass-connect.png"), "compass_connectImg");
/// assert_eq!(asset_identifier("2fa-setup.png"), "_2fa_setupImg");
/// ```
#[must_use]
pub fn asset_identifier(file_name: &str) -> String {
    let base = file_name.rsplit('/').next().unwrap_or(file_name);
    let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);
    let mut identifier = String::with_capacity(stem.len() + 4);
    for c in stem.chars() {
        identifier.push(if c.is_ascii_alphanumeric() || c == '_' {
            c
        } else {
            '_'
        });
    }
    if identifier.is_empty() {
        identifier.push('_');
    } else if identifier.starts_with(|c: char| c.is_ascii_digit()) {
        identifier.insert(0, '_');
    }
    identifier.push_str("Img");
    identifier
}

/// Normalizes backslash separators to slashes.
pub(crate) fn posix(path: &str) -> String {
    path.replace('\\', "/")
}

/// Maps an include argument to the path its fragment is emitted at.
///
/// The path is cleaned to a root-relative slash form, `.rst` and `.txt`
/// extensions are rewritten to `.mdx`, and `.mdx` is appended when the
/// argument has no extension at all.
pub(crate) fn fragment_path(argument: &str) -> String {
    let cleaned = posix(argument.trim());
    let cleaned = cleaned.trim_start_matches('/');
    if let Some(stripped) = cleaned.strip_suffix(".rst") {
        return format!("{stripped}.mdx");
    }
    if let Some(stripped) = cleaned.strip_suffix(".txt") {
        return format!("{stripped}.mdx");
    }
    let base = cleaned.rsplit('/').next().unwrap_or(cleaned);
    if base.contains('.') {
        cleaned.to_owned()
    } else {
        format!("{cleaned}.mdx")
    }
}

/// Decides where an image referenced by a page lives in the output tree.
///
/// The portion of the image path from its first `images/` segment onward is
/// kept (or `images/<basename>` is synthesized when there is none) and the
/// result is anchored under the top-level directory of the file being
/// emitted.
pub(crate) fn asset_location(output_path: &str, image_path: &str) -> String {
    let image = posix(image_path);
    let segments: Vec<&str> = image.split('/').collect();
    let tail = match segments.iter().position(|seg| *seg == "images") {
        Some(idx) => segments[idx..].join("/"),
        None => {
            let base = image.rsplit('/').next().unwrap_or(&image);
            format!("images/{base}")
        }
    };
    match output_path.split_once('/') {
        Some((top, _)) if !top.is_empty() => format!("{top}/{tail}"),
        _ => tail,
    }
}
