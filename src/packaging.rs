//! Deterministic packaging-manifest templates.
//!
//! Both renderers template static text from provided URLs and checksums so
//! release automation stays offline-friendly; nothing here fetches or
//! verifies the referenced artifacts.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Strip an optional leading `v` from a release tag.
pub fn sanitize_version(raw: &str) -> Result<&str> {
    let sanitized = raw.trim_start_matches('v');
    if sanitized.is_empty() {
        bail!("version must contain at least one numeric component");
    }
    Ok(sanitized)
}

pub fn render_formula(
    version: &str,
    arm64_url: &str,
    arm64_sha: &str,
    x86_url: &str,
    x86_sha: &str,
) -> String {
    format!(
        r##"class Relgate < Formula
  desc "Release-gate toolkit for coverage thresholds and packaging checks"
  homepage "https://github.com/relgate/relgate"
  version "{version}"
  license "MIT"

  on_macos do
    on_arm do
      url "{arm64_url}"
      sha256 "{arm64_sha}"
    end

    on_intel do
      url "{x86_url}"
      sha256 "{x86_sha}"
    end
  end

  def install
    bin.install "relgate"
    prefix.install "README.md", "LICENSE"
  end

  test do
    assert_match version.to_s, shell_output("#{{bin}}/relgate --version")
  end
end
"##
    )
}

pub fn render_pkgbuild(
    version: &str,
    pkgrel: &str,
    x86_url: &str,
    x86_sha: &str,
    aarch64_url: &str,
    aarch64_sha: &str,
) -> String {
    format!(
        r#"# Maintainer: relgate maintainers <maintainers@relgate.invalid>
pkgname=relgate
pkgver={version}
pkgrel={pkgrel}
pkgdesc="Release-gate toolkit for coverage thresholds and packaging checks"
arch=('x86_64' 'aarch64')
url="https://github.com/relgate/relgate"
license=('MIT')
depends=('glibc')
provides=('relgate')
conflicts=('relgate-bin')
source_x86_64=('{x86_url}')
sha256sums_x86_64=('{x86_sha}')
source_aarch64=('{aarch64_url}')
sha256sums_aarch64=('{aarch64_sha}')
options=('!strip')

prepare() {{
  mkdir -p "$srcdir/extracted"
}}

build() {{
  return 0
}}

package() {{
  local archive
  case "$CARCH" in
    x86_64)
      archive="$(basename "{x86_url}")"
      ;;
    aarch64)
      archive="$(basename "{aarch64_url}")"
      ;;
    *)
      echo "Unsupported architecture: $CARCH" >&2
      return 1
      ;;
  esac

  bsdtar -xf "$srcdir/$archive" -C "$srcdir/extracted"
  local staged_dir="$srcdir/extracted/relgate-v${{pkgver}}"
  install -Dm755 "$staged_dir/relgate" "$pkgdir/usr/local/bin/relgate"
  install -Dm644 "$staged_dir/README.md" "$pkgdir/usr/share/doc/relgate/README.md"
  install -Dm644 "$staged_dir/LICENSE" "$pkgdir/usr/share/doc/relgate/LICENSE"
}}
"#
    )
}

/// Create parent directories and write the rendered template.
pub fn write_rendered(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_leading_v() {
        assert_eq!(sanitize_version("v1.2.3").expect("sanitize"), "1.2.3");
        assert_eq!(sanitize_version("1.2.3").expect("sanitize"), "1.2.3");
        assert!(sanitize_version("v").is_err());
    }

    #[test]
    fn formula_embeds_version_and_artifacts() {
        let formula = render_formula(
            "1.2.3",
            "https://example.invalid/relgate-arm64.zip",
            "aaaa",
            "https://example.invalid/relgate-x86_64.zip",
            "bbbb",
        );
        assert!(formula.contains(r#"version "1.2.3""#));
        assert!(formula.contains("relgate-arm64.zip"));
        assert!(formula.contains(r#"sha256 "bbbb""#));
        assert!(formula.contains(r##"shell_output("#{bin}/relgate --version")"##));
    }

    #[test]
    fn formula_is_deterministic() {
        let render = || render_formula("1.0.0", "u1", "s1", "u2", "s2");
        assert_eq!(render(), render());
    }

    #[test]
    fn pkgbuild_embeds_checksums_per_arch() {
        let pkgbuild = render_pkgbuild(
            "1.2.3",
            "2",
            "https://example.invalid/x.tar.gz",
            "cccc",
            "https://example.invalid/a.tar.gz",
            "dddd",
        );
        assert!(pkgbuild.contains("pkgver=1.2.3"));
        assert!(pkgbuild.contains("pkgrel=2"));
        assert!(pkgbuild.contains("sha256sums_x86_64=('cccc')"));
        assert!(pkgbuild.contains("sha256sums_aarch64=('dddd')"));
        assert!(pkgbuild.contains(r#"staged_dir="$srcdir/extracted/relgate-v${pkgver}""#));
    }

    #[test]
    fn write_rendered_creates_parent_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dest = temp.path().join("packaging").join("relgate.rb");
        write_rendered(&dest, "contents").expect("write");
        assert_eq!(fs::read_to_string(&dest).expect("read"), "contents");
    }
}
