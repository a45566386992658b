//! Platform font directories
//!
//! Lists the usual font directories of the running platform. On Linux and
//! the BSDs, the directories declared in the fontconfig configuration
//! (`<dir>` elements, following `<include>`s) are added to the list.

use crate::{FontError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

/// Existing, absolute, deduplicated font directories of the platform,
/// sorted.
pub fn default_font_directories() -> Result<Vec<PathBuf>> {
    let candidates = platform_directories();
    let dirs = valid_directories(candidates);
    if dirs.is_empty() {
        return Err(FontError::NoFontDirectory);
    }
    tracing::info!("using font directories {:?}", dirs);
    Ok(dirs)
}

#[cfg(target_os = "windows")]
fn platform_directories() -> Vec<PathBuf> {
    let sys_root = env::var("SYSTEMROOT")
        .or_else(|_| env::var("SYSTEMDRIVE"))
        .unwrap_or_else(|_| "C:".to_string());
    let drive: String = sys_root.chars().take(2).collect();
    let mut dirs = vec![PathBuf::from(format!("{}\\Windows\\Fonts", drive))];
    if let Ok(windir) = env::var("windir") {
        dirs.push(Path::new(&windir).join("Fonts"));
    }
    if let Some(local) = dirs::data_local_dir() {
        dirs.push(local.join("Microsoft").join("Windows").join("Fonts"));
    }
    dirs
}

#[cfg(target_os = "macos")]
fn platform_directories() -> Vec<PathBuf> {
    [
        "/System/Library/Fonts",
        "/Library/Fonts",
        "~/Library/Fonts",
        "/Network/Library/Fonts",
        "/System/Library/Assets/com_apple_MobileAsset_Font3",
        "/System/Library/Assets/com_apple_MobileAsset_Font4",
        "/System/Library/Assets/com_apple_MobileAsset_Font5",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

#[cfg(target_os = "ios")]
fn platform_directories() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from("/System/Library/Fonts/Cache"),
    ]
}

#[cfg(target_os = "android")]
fn platform_directories() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/system/fonts"),
        PathBuf::from("/system/font"),
        PathBuf::from("/data/fonts"),
    ]
}

#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "ios",
    target_os = "android"
)))]
fn platform_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = [
        "/usr/X11R6/lib/X11/fonts",
        "/usr/local/share/fonts",
        "/usr/share/fonts",
        "/usr/share/texmf/fonts/opentype/public",
        "~/.fonts",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect();

    let fc = FontconfigEnv::from_env();
    dirs.push(fc.xdg_data_home.join("fonts"));
    if let Some(data_dirs) = env::var_os("XDG_DATA_DIRS") {
        dirs.extend(env::split_paths(&data_dirs).map(|p| p.join("fonts")));
    }

    match fc.font_dirs() {
        Ok(fc_dirs) => dirs.extend(fc_dirs),
        Err(err) => tracing::warn!("unable to process fontconfig configuration: {}", err),
    }
    dirs
}

/// Keep the existing directories, made absolute, without duplicates.
pub fn valid_directories(candidates: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for dir in candidates {
        let dir = expand_user(&dir);
        let dir = match std::path::absolute(&dir) {
            Ok(dir) => dir,
            Err(_) => continue,
        };
        if !seen.insert(dir.clone()) {
            continue;
        }
        match std::fs::metadata(&dir) {
            Ok(meta) if meta.is_dir() => out.push(dir),
            Ok(_) => tracing::warn!("font dir is not a directory: {:?}", dir),
            Err(_) => {}
        }
    }
    out.sort();
    out
}

/// Replace a leading `~` by the home directory.
pub fn expand_user(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// The environment deciding how fontconfig finds its configuration
#[derive(Debug, Clone, Default)]
pub struct FontconfigEnv {
    /// User data directory (`$XDG_DATA_HOME`)
    pub xdg_data_home: PathBuf,
    /// User configuration directory (`$XDG_CONFIG_HOME`)
    pub xdg_config_home: PathBuf,
    pub user_home: PathBuf,
    /// Name or path of the root configuration file (`$FONTCONFIG_FILE`)
    pub config_file: PathBuf,
    /// Directories searched for relative configuration paths (`$FONTCONFIG_PATH`)
    pub paths: Vec<PathBuf>,
    /// Prepended to every path (`$FONTCONFIG_SYSROOT`)
    pub sysroot: Option<PathBuf>,
}

impl FontconfigEnv {
    pub fn from_env() -> Self {
        let home = dirs::home_dir().unwrap_or_default();
        let path_or = |var: &str, default: PathBuf| env::var_os(var).map(PathBuf::from).unwrap_or(default);
        Self {
            xdg_data_home: path_or("XDG_DATA_HOME", home.join(".local").join("share")),
            xdg_config_home: path_or("XDG_CONFIG_HOME", home.join(".config")),
            config_file: path_or("FONTCONFIG_FILE", PathBuf::from("fonts.conf")),
            paths: match env::var_os("FONTCONFIG_PATH") {
                Some(paths) => env::split_paths(&paths).collect(),
                None => vec![PathBuf::from("/etc/fonts")],
            },
            sysroot: env::var_os("FONTCONFIG_SYSROOT")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            user_home: home,
        }
    }

    fn with_sysroot(&self, path: PathBuf) -> PathBuf {
        match &self.sysroot {
            Some(root) if !path.starts_with(root) => {
                root.join(path.strip_prefix("/").unwrap_or(&path))
            }
            _ => path,
        }
    }

    /// Resolve a path referenced by the configuration, the way fontconfig
    /// does. Relative paths are searched in [`FontconfigEnv::paths`].
    pub fn resolve_path(&self, path: &Path) -> Option<PathBuf> {
        if path.is_absolute() {
            return Some(self.with_sysroot(path.to_path_buf()));
        }
        if let Ok(rest) = path.strip_prefix("~") {
            return Some(self.with_sysroot(self.user_home.join(rest)));
        }
        let found = self
            .paths
            .iter()
            .map(|dir| self.with_sysroot(dir.join(path)))
            .find(|candidate| candidate.exists());
        if found.is_none() {
            tracing::debug!("fontconfig path {:?} could not be resolved", path);
        }
        found
    }

    /// Font directories declared by the configuration, following includes.
    /// Each configuration file is read at most once.
    pub fn font_dirs(&self) -> Result<Vec<PathBuf>> {
        let root = self
            .resolve_path(&self.config_file)
            .ok_or_else(|| FontError::Fontconfig(format!("{:?} not found", self.config_file)))?;
        let cwd = env::current_dir()?;

        let mut seen: HashSet<PathBuf> = HashSet::new();
        seen.insert(root.clone());
        let (mut dirs, mut includes) = self.parse_file(&root, &cwd)?;

        let mut i = 0;
        while i < includes.len() {
            let include = includes[i].clone();
            i += 1;
            if !seen.insert(include.clone()) {
                continue;
            }
            let meta = match std::fs::metadata(&include) {
                Ok(meta) => meta,
                Err(_) => {
                    tracing::warn!("missing fontconfig include {:?}: skipping", include);
                    continue;
                }
            };
            let (new_dirs, new_includes) = if meta.is_dir() {
                self.parse_dir(&include, &cwd, &mut seen)?
            } else {
                self.parse_file(&include, &cwd)?
            };
            dirs.extend(new_dirs);
            includes.extend(new_includes);
        }
        Ok(dirs)
    }

    /// Parse the `[0-9]*.conf` files of a configuration directory, in
    /// name order.
    fn parse_dir(
        &self,
        dir: &Path,
        cwd: &Path,
        seen: &mut HashSet<PathBuf>,
    ) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
            .map(|entry| entry.path())
            .filter(|path| is_numbered_conf(path))
            .collect();
        files.sort();

        let mut dirs = Vec::new();
        let mut includes = Vec::new();
        for file in files {
            seen.insert(file.clone());
            let (d, i) = self.parse_file(&file, cwd)?;
            dirs.extend(d);
            includes.extend(i);
        }
        Ok((dirs, includes))
    }

    /// Read one configuration file, returning its font directories and its
    /// (resolved) includes.
    pub fn parse_file(&self, file: &Path, cwd: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        let content = std::fs::read_to_string(file)?;
        let directives = parse_directives(&content)
            .map_err(|e| FontError::Fontconfig(format!("{:?}: {}", file, e)))?;

        let mut dirs = Vec::new();
        let mut includes = Vec::new();
        for directive in directives {
            match directive {
                Directive::Dir { path, prefix } => {
                    let path = PathBuf::from(path);
                    let dir = match prefix.as_deref() {
                        Some("default") | Some("cwd") => cwd.join(path),
                        Some("relative") => file.parent().unwrap_or(Path::new("/")).join(path),
                        Some("xdg") => self.xdg_data_home.join(path),
                        _ => path,
                    };
                    dirs.push(dir);
                }
                Directive::Include { path, prefix } => {
                    let mut path = PathBuf::from(path);
                    if prefix.as_deref() == Some("xdg") {
                        path = self.xdg_config_home.join(path);
                    }
                    if let Some(include) = self.resolve_path(&path) {
                        includes.push(include);
                    }
                }
            }
        }
        Ok((dirs, includes))
    }
}

fn is_numbered_conf(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".conf") && name.starts_with(|c: char| c.is_ascii_digit()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Directive {
    Dir { path: String, prefix: Option<String> },
    Include { path: String, prefix: Option<String> },
}

fn attribute(event: &BytesStart, name: &[u8]) -> Option<String> {
    event
        .attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// Extract the `<dir>` and `<include>` elements of a configuration file.
fn parse_directives(content: &str) -> std::result::Result<Vec<Directive>, quick_xml::Error> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut out = Vec::new();
    // element being read, with its prefix attribute and its text so far
    let mut current: Option<(bool, Option<String>, String)> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"dir" => current = Some((true, attribute(e, b"prefix"), String::new())),
                b"include" => current = Some((false, attribute(e, b"prefix"), String::new())),
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if let Some((_, _, text)) = current.as_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                if name.as_ref() == b"dir" || name.as_ref() == b"include" {
                    if let Some((is_dir, prefix, path)) = current.take() {
                        let path = path.trim().to_string();
                        if !path.is_empty() {
                            out.push(if is_dir {
                                Directive::Dir { path, prefix }
                            } else {
                                Directive::Include { path, prefix }
                            });
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e),
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn env_for(root: &Path) -> FontconfigEnv {
        FontconfigEnv {
            xdg_data_home: root.join("data"),
            xdg_config_home: root.join("config"),
            user_home: root.join("home"),
            config_file: PathBuf::from("fonts.conf"),
            paths: vec![root.join("etc")],
            sysroot: None,
        }
    }

    #[test]
    fn test_parse_directives() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE fontconfig SYSTEM "urn:fontconfig:fonts.dtd">
<fontconfig>
    <dir>/usr/share/fonts</dir>
    <dir prefix="xdg">fonts</dir>
    <match target="pattern"><edit name="family"><string>x</string></edit></match>
    <include ignore_missing="yes">conf.d</include>
    <dir></dir>
</fontconfig>"#;
        let directives = parse_directives(xml).unwrap();
        assert_eq!(
            directives,
            vec![
                Directive::Dir { path: "/usr/share/fonts".into(), prefix: None },
                Directive::Dir { path: "fonts".into(), prefix: Some("xdg".into()) },
                Directive::Include { path: "conf.d".into(), prefix: None },
            ]
        );
    }

    #[test]
    fn test_dir_prefixes() {
        let tmp = TempDir::new().unwrap();
        let etc = tmp.path().join("etc");
        fs::create_dir_all(&etc).unwrap();
        let conf = etc.join("fonts.conf");
        fs::write(
            &conf,
            r#"<fontconfig>
                <dir>/abs/fonts</dir>
                <dir prefix="relative">rel</dir>
                <dir prefix="xdg">fonts</dir>
                <dir prefix="cwd">here</dir>
            </fontconfig>"#,
        )
        .unwrap();

        let env = env_for(tmp.path());
        let (dirs, includes) = env.parse_file(&conf, Path::new("/work")).unwrap();
        assert!(includes.is_empty());
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/abs/fonts"),
                etc.join("rel"),
                tmp.path().join("data").join("fonts"),
                PathBuf::from("/work/here"),
            ]
        );
    }

    #[test]
    fn test_includes_are_followed_once() {
        let tmp = TempDir::new().unwrap();
        let etc = tmp.path().join("etc");
        let conf_d = etc.join("conf.d");
        fs::create_dir_all(&conf_d).unwrap();
        fs::write(
            etc.join("fonts.conf"),
            "<fontconfig><dir>/a</dir><include>conf.d</include><include>missing.conf</include></fontconfig>",
        )
        .unwrap();
        // includes the root again, which must not loop
        fs::write(
            conf_d.join("10-extra.conf"),
            "<fontconfig><dir>/b</dir><include>fonts.conf</include></fontconfig>",
        )
        .unwrap();
        fs::write(conf_d.join("README"), "<fontconfig><dir>/ignored</dir></fontconfig>").unwrap();
        fs::write(conf_d.join("extra.conf"), "<fontconfig><dir>/ignored</dir></fontconfig>").unwrap();

        let dirs = env_for(tmp.path()).font_dirs().unwrap();
        assert_eq!(dirs, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn test_missing_root() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(env_for(tmp.path()).font_dirs(), Err(FontError::Fontconfig(_))));
    }

    #[test]
    fn test_sysroot() {
        let env = FontconfigEnv {
            sysroot: Some(PathBuf::from("/sysroot")),
            ..Default::default()
        };
        assert_eq!(
            env.resolve_path(Path::new("/etc/fonts/fonts.conf")),
            Some(PathBuf::from("/sysroot/etc/fonts/fonts.conf"))
        );
        assert_eq!(
            env.resolve_path(Path::new("/sysroot/etc/x.conf")),
            Some(PathBuf::from("/sysroot/etc/x.conf"))
        );
    }

    #[test]
    fn test_valid_directories() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        let file = tmp.path().join("file");
        fs::write(&file, b"").unwrap();

        let dirs = valid_directories(vec![b.clone(), a.clone(), b.clone(), file, tmp.path().join("nope")]);
        assert_eq!(dirs, vec![a, b]);
    }
}
