//! Protocol records mirrored as host `repr(C)` structs.
//!
//! The host compiler lays these out with the same packing the protocol header
//! requests, so `size_of` and `offset_of!` are an independent reference for
//! the engine on whatever platform the tests run on.

#![allow(non_snake_case, dead_code, unused_imports)]

use std::ffi::c_void;
use std::mem::{offset_of, size_of};
use std::os::raw::{c_int, c_long, c_uint, c_ulong};

use twlayout_core::LayoutEngine;
use twlayout_targets::{PlatformProfile, Toolchain};

#[cfg(not(target_os = "macos"))]
type TwInt32 = c_long;
#[cfg(not(target_os = "macos"))]
type TwUInt32 = c_ulong;
#[cfg(target_os = "macos")]
type TwInt32 = c_int;
#[cfg(target_os = "macos")]
type TwUInt32 = c_uint;

#[cfg(target_env = "msvc")]
type TwUIntPtr = c_uint;
#[cfg(not(target_env = "msvc"))]
type TwUIntPtr = usize;

#[cfg(target_os = "macos")]
type TwId = *mut c_void;
#[cfg(not(target_os = "macos"))]
type TwId = TwUInt32;

type TwHandle = *mut c_void;
type TwMemRef = *mut c_void;
type EntryProc = Option<unsafe extern "C" fn()>;

macro_rules! protocol_record {
    ($(#[$meta:meta])* struct $name:ident { $($field:ident: $ty:ty,)* }) => {
        $(#[$meta])*
        #[cfg_attr(target_os = "macos", repr(C))]
        #[cfg_attr(not(target_os = "macos"), repr(C, packed(2)))]
        struct $name { $($field: $ty,)* }
    };
}

#[derive(Clone, Copy)]
#[cfg_attr(target_os = "macos", repr(C))]
#[cfg_attr(not(target_os = "macos"), repr(C, packed(2)))]
union TwInfoUnion {
    ReturnCode: u16,
    CondCode: u16,
}

#[derive(Clone, Copy)]
#[cfg_attr(target_os = "macos", repr(C))]
#[cfg_attr(not(target_os = "macos"), repr(C, packed(2)))]
union TwSubDirectories {
    Recursive: c_int,
    Subdirectories: u16,
}

#[derive(Clone, Copy)]
#[cfg_attr(target_os = "macos", repr(C))]
#[cfg_attr(not(target_os = "macos"), repr(C, packed(2)))]
union TwFileType {
    FileType: TwInt32,
    FileSystemType: TwUInt32,
}

protocol_record!(struct TwFix32 {
    Whole: i16,
    Frac: u16,
});

protocol_record!(struct TwCapability {
    Cap: u16,
    ConType: u16,
    hContainer: TwHandle,
});

protocol_record!(struct TwInfo {
    InfoID: u16,
    ItemType: u16,
    NumItems: u16,
    Union: TwInfoUnion,
    Item: TwUIntPtr,
});

protocol_record!(struct TwFileSystem {
    InputName: [i8; 256],
    OutputName: [i8; 256],
    Context: TwMemRef,
    UnionSubDirectories: TwSubDirectories,
    UnionFileType: TwFileType,
    Size: TwUInt32,
    CreateTimeDate: [i8; 34],
    ModifiedTimeDate: [i8; 34],
    FreeSpace: TwUInt32,
    NewImageSize: TwInt32,
    NumberOfFiles: TwUInt32,
    NumberOfSnippets: TwUInt32,
    DeviceGroupMask: TwUInt32,
    Reserved: [i8; 508],
});

protocol_record!(struct TwVersion {
    MajorNum: u16,
    MinorNum: u16,
    Language: u16,
    Country: u16,
    Info: [i8; 34],
});

protocol_record!(struct TwIdentity {
    Id: TwId,
    Version: TwVersion,
    ProtocolMajor: u16,
    ProtocolMinor: u16,
    SupportedGroups: TwUInt32,
    Manufacturer: [i8; 34],
    ProductFamily: [i8; 34],
    ProductName: [i8; 34],
});

protocol_record!(struct TwEnumeration {
    ItemType: u16,
    NumItems: TwUInt32,
    CurrentIndex: TwUInt32,
    DefaultIndex: TwUInt32,
    ItemList: [u8; 1],
});

protocol_record!(#[derive(Clone, Copy)] struct TwMemory {
    Flags: TwUInt32,
    Length: TwUInt32,
    TheMem: TwMemRef,
});

protocol_record!(struct TwJpegCompression {
    ColorSpace: u16,
    SubSampling: TwUInt32,
    NumComponents: u16,
    RestartFrequency: u16,
    QuantMap: [u16; 4],
    QuantTable: [TwMemory; 4],
    HuffmanMap: [u16; 4],
    HuffmanDC: [TwMemory; 2],
    HuffmanAC: [TwMemory; 2],
});

protocol_record!(struct TwEntryPoint {
    Size: TwUInt32,
    DSM_Entry: EntryProc,
    DSM_MemAllocate: EntryProc,
    DSM_MemFree: EntryProc,
    DSM_MemLock: EntryProc,
    DSM_MemUnlock: EntryProc,
});

fn host_profile() -> PlatformProfile {
    let toolchain = if cfg!(target_env = "msvc") {
        Some(Toolchain::Msvc)
    } else if cfg!(target_os = "windows") {
        Some(Toolchain::Gnu)
    } else {
        None
    };
    PlatformProfile::host(toolchain).unwrap()
}

macro_rules! assert_mirrors {
    ($engine:expr, $name:literal, $ty:ty, [$($field:ident),* $(,)?]) => {{
        let layout = $engine.layout_of($name).unwrap();
        assert_eq!(layout.size, size_of::<$ty>() as u64, "size of {}", $name);
        $(
            assert_eq!(
                layout.offset_of(stringify!($field)),
                Some(offset_of!($ty, $field) as u64),
                "offset of {}.{}",
                $name,
                stringify!($field)
            );
        )*
    }};
}

#[test]
fn engine_matches_host_compiler() {
    let profile = host_profile();
    let catalog = crate::catalog(&profile).unwrap();
    let mut engine = LayoutEngine::new(&profile, &catalog);

    assert_mirrors!(engine, "TW_FIX32", TwFix32, [Whole, Frac]);
    assert_mirrors!(engine, "TW_CAPABILITY", TwCapability, [Cap, ConType, hContainer]);
    assert_mirrors!(engine, "TW_INFO", TwInfo, [InfoID, ItemType, NumItems, Union, Item]);
    assert_mirrors!(
        engine,
        "TW_FILESYSTEM",
        TwFileSystem,
        [
            InputName,
            OutputName,
            Context,
            UnionSubDirectories,
            UnionFileType,
            Size,
            CreateTimeDate,
            ModifiedTimeDate,
            FreeSpace,
            NewImageSize,
            NumberOfFiles,
            NumberOfSnippets,
            DeviceGroupMask,
            Reserved,
        ]
    );
    assert_mirrors!(engine, "TW_VERSION", TwVersion, [MajorNum, MinorNum, Language, Country, Info]);
    assert_mirrors!(
        engine,
        "TW_IDENTITY",
        TwIdentity,
        [
            Id,
            Version,
            ProtocolMajor,
            ProtocolMinor,
            SupportedGroups,
            Manufacturer,
            ProductFamily,
            ProductName,
        ]
    );
    assert_mirrors!(
        engine,
        "TW_ENUMERATION",
        TwEnumeration,
        [ItemType, NumItems, CurrentIndex, DefaultIndex, ItemList]
    );
    assert_mirrors!(engine, "TW_MEMORY", TwMemory, [Flags, Length, TheMem]);
    assert_mirrors!(
        engine,
        "TW_JPEGCOMPRESSION",
        TwJpegCompression,
        [
            ColorSpace,
            SubSampling,
            NumComponents,
            RestartFrequency,
            QuantMap,
            QuantTable,
            HuffmanMap,
            HuffmanDC,
            HuffmanAC,
        ]
    );
    assert_mirrors!(
        engine,
        "TW_ENTRYPOINT",
        TwEntryPoint,
        [Size, DSM_Entry, DSM_MemAllocate, DSM_MemFree, DSM_MemLock, DSM_MemUnlock]
    );
}
