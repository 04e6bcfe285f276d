#![allow(dead_code)]

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use tempfile::{TempDir, tempdir};

const FAKE_CONVERT: &str = r#"#!/bin/sh
if [ "$1" = "-version" ]; then
  echo "Version: ImageMagick 6.9.12-fake"
  exit 0
fi
if [ -n "$FAKE_CONVERT_FAIL" ]; then
  echo "$FAKE_CONVERT_FAIL" >&2
  exit 1
fi
target="$5"
template="$6"
case "$target" in
  *\]) index="${target##*\[}"; index="${index%\]}"; first=$((index + 1)); last=$first ;;
  *) first=1; last="$FAKE_PAGES" ;;
esac
scene=0
page=$first
while [ "$page" -le "$last" ] && [ "$page" -le "$FAKE_PAGES" ]; do
  out=$(printf "$template" "$scene")
  if [ "$page" = "$FAKE_GARBAGE_PAGE" ]; then
    printf 'not a png' > "$out"
  else
    cp "$FAKE_PAGE_DIR/page$page.png" "$out"
  fi
  scene=$((scene + 1))
  page=$((page + 1))
done
"#;

const FAKE_IDENTIFY: &str = r#"#!/bin/sh
if [ -n "$FAKE_IDENTIFY_FAIL" ]; then
  echo "$FAKE_IDENTIFY_FAIL" >&2
  exit 1
fi
i=0
while [ "$i" -lt "$FAKE_PAGES" ]; do
  echo "$FAKE_PAGES"
  i=$((i + 1))
done
"#;

/// Stand-in ImageMagick install. Page `n` of the fake document renders as an
/// `n`x`1` PNG so tests can tell pages apart by width.
pub struct FakeMagick {
    pub root: TempDir,
    pub convert: PathBuf,
    pub identify: PathBuf,
    pub pages_dir: PathBuf,
    pub tmp_dir: PathBuf,
    pub pdf: PathBuf,
    pub pages: u32,
}

impl FakeMagick {
    pub fn new(pages: u32) -> Result<Self, Box<dyn std::error::Error>> {
        let root = tempdir()?;
        let bin_dir = root.path().join("bin");
        let pages_dir = root.path().join("pages");
        let tmp_dir = root.path().join("tmp");
        for dir in [&bin_dir, &pages_dir, &tmp_dir] {
            fs::create_dir_all(dir)?;
        }

        let convert = bin_dir.join("convert");
        let identify = bin_dir.join("identify");
        write_script(&convert, FAKE_CONVERT)?;
        write_script(&identify, FAKE_IDENTIFY)?;

        for page in 1..=pages {
            image::RgbImage::new(page, 1).save(pages_dir.join(format!("page{page}.png")))?;
        }

        let pdf = root.path().join("sample.pdf");
        fs::write(&pdf, b"%PDF-1.4\n")?;

        Ok(Self {
            root,
            convert,
            identify,
            pages_dir,
            tmp_dir,
            pdf,
            pages,
        })
    }

    pub fn command(&self, bin: &str) -> Command {
        let mut command = Command::new(bin);
        command
            .env("PDF_IMAGE_CONVERT_BIN", &self.convert)
            .env("PDF_IMAGE_IDENTIFY_BIN", &self.identify)
            .env("FAKE_PAGES", self.pages.to_string())
            .env("FAKE_PAGE_DIR", &self.pages_dir)
            .env("TMPDIR", &self.tmp_dir)
            .env_remove("FAKE_CONVERT_FAIL")
            .env_remove("FAKE_IDENTIFY_FAIL")
            .env_remove("FAKE_GARBAGE_PAGE");
        command
    }

    /// Workspaces still present under the server's temp dir.
    pub fn leftover_workspaces(&self) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
        let mut leftovers = Vec::new();
        for entry in fs::read_dir(&self.tmp_dir)? {
            let entry = entry?;
            if entry
                .file_name()
                .to_string_lossy()
                .starts_with("pdf-to-png-")
            {
                leftovers.push(entry.path());
            }
        }
        Ok(leftovers)
    }
}

fn write_script(path: &Path, body: &str) -> std::io::Result<()> {
    fs::write(path, body)?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

pub struct Server {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl Server {
    pub fn spawn(mut command: Command) -> Result<Self, Box<dyn std::error::Error>> {
        let mut child = command
            .args(["serve", "--stdio"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;
        let stdin = child.stdin.take().expect("stdin available");
        let stdout = BufReader::new(child.stdout.take().expect("stdout available"));
        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }

    pub fn request(
        &mut self,
        request: serde_json::Value,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        let serialized = serde_json::to_string(&request)?;
        writeln!(self.stdin, "{serialized}")?;
        self.stdin.flush()?;

        let mut line = String::new();
        self.stdout.read_line(&mut line)?;
        Ok(serde_json::from_str(line.trim())?)
    }

    pub fn call_tool(
        &mut self,
        id: u64,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        let response = self.request(serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {
                "name": name,
                "arguments": arguments
            }
        }))?;
        Ok(response.get("result").cloned().expect("result present"))
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub fn content_parts(result: &serde_json::Value) -> Vec<serde_json::Value> {
    result
        .get("content")
        .and_then(|value| value.as_array())
        .cloned()
        .expect("content array present")
}

pub fn image_width(part: &serde_json::Value) -> u32 {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    let data = part
        .get("data")
        .and_then(|value| value.as_str())
        .expect("image data present");
    let bytes = STANDARD.decode(data).expect("valid base64");
    image::load_from_memory(&bytes).expect("valid png").width()
}
