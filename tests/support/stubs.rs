//! Executable shell stubs standing in for the external media tools.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

fn write_executable(dir: &Path, name: &str, script: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, script).expect("write stub script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod stub script");
    path.display().to_string()
}

/// A transcoder stub that copies its input to its output.
///
/// The invocation shape is `<program> -i <input> <args..> <output> -y
/// -loglevel error`, so the input follows `-i` and the output precedes `-y`.
/// Inputs whose path contains `fail_marker` exit non-zero with diagnostics
/// on stderr.
pub fn copy_transcoder(dir: &Path, fail_marker: Option<&str>) -> String {
    let fail_clause = match fail_marker {
        Some(marker) => format!(
            "case \"$input\" in *{marker}*) echo 'stub transcoder refused' >&2; exit 1 ;; esac\n"
        ),
        None => String::new(),
    };
    let script = format!(
        "#!/bin/sh\n\
         prev=\"\"; input=\"\"; output=\"\"\n\
         for a in \"$@\"; do\n\
           [ \"$prev\" = \"-i\" ] && input=\"$a\"\n\
           [ \"$a\" = \"-y\" ] && output=\"$prev\"\n\
           prev=\"$a\"\n\
         done\n\
         {fail_clause}\
         cp \"$input\" \"$output\"\n"
    );
    write_executable(dir, "stub-transcoder", &script)
}

/// A prober stub reporting a fixed duration for every file.
pub fn fixed_prober(dir: &Path, duration: &str) -> String {
    write_executable(dir, "stub-prober", &format!("#!/bin/sh\necho {duration}\n"))
}

/// A prober stub reporting 45.0 for paths containing `long_marker` and 10.0
/// otherwise.
pub fn marker_prober(dir: &Path, long_marker: &str) -> String {
    let script = format!(
        "#!/bin/sh\n\
         for a in \"$@\"; do last=\"$a\"; done\n\
         case \"$last\" in\n\
           *{long_marker}*) echo 45.0 ;;\n\
           *) echo 10.0 ;;\n\
         esac\n"
    );
    write_executable(dir, "stub-marker-prober", &script)
}
