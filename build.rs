use std::{env, path::PathBuf};

/// Environment variables that change how `ffmpeg-sys-next` finds FFmpeg.
const DISCOVERY_VARIABLES: [&str; 4] = [
    "FFMPEG_DIR",
    "VCPKG_ROOT",
    "VCPKGRS_DYNAMIC",
    "VCPKGRS_TRIPLET",
];

fn main() {
    for variable in DISCOVERY_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    // pkg-config finds FFmpeg everywhere except Windows.
    if env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() != "windows" {
        return;
    }
    if env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    let Some(vcpkg_root) = env::var_os("VCPKG_ROOT") else {
        println!(
            "cargo:warning=framesnap needs the FFmpeg development libraries. \
             Install them with vcpkg and set FFMPEG_DIR to the install prefix."
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let prefix = PathBuf::from(vcpkg_root).join("installed").join(triplet);

    if !prefix.join("include").join("libavformat").exists() {
        println!(
            "cargo:warning=No FFmpeg headers under {}; run `vcpkg install ffmpeg` first.",
            prefix.display()
        );
        return;
    }

    println!(
        "cargo:warning=Found vcpkg FFmpeg at {0}; set FFMPEG_DIR={0} to skip this probe.",
        prefix.display()
    );
    if env::var_os("VCPKGRS_DYNAMIC").is_none() {
        println!("cargo:warning=Set VCPKGRS_DYNAMIC=1 if this FFmpeg was built as DLLs.");
    }
}
