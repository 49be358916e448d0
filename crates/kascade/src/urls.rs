//! Site origin and URL rendering.

/// Origin every internal API endpoint hangs off of.
pub const KA_ORIGIN: &str = "https://www.khanacademy.org";

/// Render an absolute URL on the Khan Academy origin.
pub fn ka_url(path: impl AsRef<str>) -> String {
    format!("{KA_ORIGIN}/{}", path.as_ref())
}
