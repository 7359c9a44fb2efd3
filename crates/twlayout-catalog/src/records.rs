//! Composite protocol records, in header order.
//!
//! Field names, order and kinds follow the protocol header. Anonymous unions
//! are given the names the reference harness reports them under.

use twlayout_core::{CatalogBuilder, FieldDescriptor, FieldType, PlatformSelect, Result};
use twlayout_targets::OsFamily;
use twlayout_targets::PrimitiveKind::{
    self, Bool, CInt, EntryProc, Handle, Int16, Int32, Int8, MemRef, UInt16, UInt32, UInt8, UIntPtr,
};

fn field(name: &str, ty: impl Into<FieldType>) -> FieldDescriptor {
    FieldDescriptor::new(name, ty)
}

fn array(ty: impl Into<FieldType>, count: u32) -> FieldType {
    FieldType::array(ty.into(), count)
}

fn record(name: &str) -> FieldType {
    FieldType::nested(name)
}

fn union(members: Vec<FieldDescriptor>) -> FieldType {
    FieldType::union(members)
}

/// `char[len]`, the protocol's fixed strings.
pub(crate) fn string(len: u32) -> FieldType {
    array(Int8, len)
}

/// `TW_MEMREF` on macOS, `TW_UINT32` elsewhere.
fn id_or_memref() -> FieldType {
    FieldType::Select(PlatformSelect::on(OsFamily::MacOs, MemRef, UInt32))
}

/// Scalar typedefs, in header order.
pub(crate) const TYPEDEFS: &[(&str, TypedefKind)] = &[
    ("TW_HANDLE", TypedefKind::Kind(Handle)),
    ("TW_MEMREF", TypedefKind::Kind(MemRef)),
    ("TW_UINTPTR", TypedefKind::Kind(UIntPtr)),
    ("TW_STR32", TypedefKind::Str(34)),
    ("TW_STR64", TypedefKind::Str(66)),
    ("TW_STR128", TypedefKind::Str(130)),
    ("TW_STR255", TypedefKind::Str(256)),
    ("TW_INT8", TypedefKind::Kind(Int8)),
    ("TW_INT16", TypedefKind::Kind(Int16)),
    ("TW_INT32", TypedefKind::Kind(Int32)),
    ("TW_UINT8", TypedefKind::Kind(UInt8)),
    ("TW_UINT16", TypedefKind::Kind(UInt16)),
    ("TW_UINT32", TypedefKind::Kind(UInt32)),
    ("TW_BOOL", TypedefKind::Kind(Bool)),
];

#[derive(Debug, Clone, Copy)]
pub(crate) enum TypedefKind {
    Kind(PrimitiveKind),
    Str(u32),
}

impl TypedefKind {
    pub(crate) fn field_type(self) -> FieldType {
        match self {
            TypedefKind::Kind(kind) => kind.into(),
            TypedefKind::Str(len) => string(len),
        }
    }
}

/// Define every composite record.
pub(crate) fn define(b: &mut CatalogBuilder<'_>) -> Result<()> {
    b.define("TW_FIX32", vec![field("Whole", Int16), field("Frac", UInt16)])?;

    b.define(
        "TW_FRAME",
        vec![
            field("Left", record("TW_FIX32")),
            field("Top", record("TW_FIX32")),
            field("Right", record("TW_FIX32")),
            field("Bottom", record("TW_FIX32")),
        ],
    )?;

    b.define(
        "TW_DECODEFUNCTION",
        [
            "StartIn",
            "BreakIn",
            "EndIn",
            "StartOut",
            "BreakOut",
            "EndOut",
            "Gamma",
            "SampleCount",
        ]
        .into_iter()
        .map(|name| field(name, record("TW_FIX32")))
        .collect(),
    )?;

    b.define(
        "TW_TRANSFORMSTAGE",
        vec![
            field("Decode", array(record("TW_DECODEFUNCTION"), 3)),
            field("Mix", array(array(record("TW_FIX32"), 3), 3)),
        ],
    )?;

    b.define(
        "TW_ARRAY",
        vec![
            field("ItemType", UInt16),
            field("NumItems", UInt32),
            field("ItemList", array(UInt8, 1)),
        ],
    )?;

    b.define(
        "TW_AUDIOINFO",
        vec![field("Name", string(256)), field("Reserved", UInt32)],
    )?;

    b.define(
        "TW_CALLBACK",
        vec![
            field("CallBackProc", MemRef),
            field("RefCon", id_or_memref()),
            field("Message", Int16),
        ],
    )?;

    b.define(
        "TW_CALLBACK2",
        vec![
            field("CallBackProc", MemRef),
            field("RefCon", UIntPtr),
            field("Message", Int16),
        ],
    )?;

    b.define(
        "TW_CAPABILITY",
        vec![
            field("Cap", UInt16),
            field("ConType", UInt16),
            field("hContainer", Handle),
        ],
    )?;

    b.define(
        "TW_CIEPOINT",
        vec![
            field("X", record("TW_FIX32")),
            field("Y", record("TW_FIX32")),
            field("Z", record("TW_FIX32")),
        ],
    )?;

    b.define(
        "TW_CIECOLOR",
        vec![
            field("ColorSpace", UInt16),
            field("LowEndian", Int16),
            field("DeviceDependent", Int16),
            field("VersionNumber", Int32),
            field("StageABC", record("TW_TRANSFORMSTAGE")),
            field("StageLMN", record("TW_TRANSFORMSTAGE")),
            field("WhitePoint", record("TW_CIEPOINT")),
            field("BlackPoint", record("TW_CIEPOINT")),
            field("WhitePaper", record("TW_CIEPOINT")),
            field("BlackInk", record("TW_CIEPOINT")),
            field("Samples", array(record("TW_FIX32"), 1)),
        ],
    )?;

    b.define(
        "TW_CUSTOMDSDATA",
        vec![field("InfoLength", UInt32), field("hData", Handle)],
    )?;

    b.define(
        "TW_DEVICEEVENT",
        vec![
            field("Event", UInt32),
            field("DeviceName", string(256)),
            field("BatteryMinutes", UInt32),
            field("BatteryPercentage", Int16),
            field("PowerSupply", Int32),
            field("XResolution", record("TW_FIX32")),
            field("YResolution", record("TW_FIX32")),
            field("FlashUsed2", UInt32),
            field("AutomaticCapture", UInt32),
            field("TimeBeforeFirstCapture", UInt32),
            field("TimeBetweenCaptures", UInt32),
        ],
    )?;

    b.define(
        "TW_ELEMENT8",
        vec![
            field("Index", UInt8),
            field("Channel1", UInt8),
            field("Channel2", UInt8),
            field("Channel3", UInt8),
        ],
    )?;

    b.define(
        "TW_ENUMERATION",
        vec![
            field("ItemType", UInt16),
            field("NumItems", UInt32),
            field("CurrentIndex", UInt32),
            field("DefaultIndex", UInt32),
            field("ItemList", array(UInt8, 1)),
        ],
    )?;

    b.define(
        "TW_EVENT",
        vec![field("pEvent", MemRef), field("TWMessage", UInt16)],
    )?;

    b.define(
        "TW_INFO",
        vec![
            field("InfoID", UInt16),
            field("ItemType", UInt16),
            field("NumItems", UInt16),
            field(
                "Union",
                union(vec![field("ReturnCode", UInt16), field("CondCode", UInt16)]),
            ),
            field("Item", UIntPtr),
        ],
    )?;

    b.define(
        "TW_EXTIMAGEINFO",
        vec![
            field("NumInfos", UInt32),
            field("Info", array(record("TW_INFO"), 1)),
        ],
    )?;

    b.define(
        "TW_FILESYSTEM",
        vec![
            field("InputName", string(256)),
            field("OutputName", string(256)),
            field("Context", MemRef),
            field(
                "UnionSubDirectories",
                union(vec![field("Recursive", CInt), field("Subdirectories", Bool)]),
            ),
            field(
                "UnionFileType",
                union(vec![field("FileType", Int32), field("FileSystemType", UInt32)]),
            ),
            field("Size", UInt32),
            field("CreateTimeDate", string(34)),
            field("ModifiedTimeDate", string(34)),
            field("FreeSpace", UInt32),
            field("NewImageSize", Int32),
            field("NumberOfFiles", UInt32),
            field("NumberOfSnippets", UInt32),
            field("DeviceGroupMask", UInt32),
            field("Reserved", array(Int8, 508)),
        ],
    )?;

    b.define(
        "TW_GRAYRESPONSE",
        vec![field("Response", array(record("TW_ELEMENT8"), 1))],
    )?;

    b.define(
        "TW_VERSION",
        vec![
            field("MajorNum", UInt16),
            field("MinorNum", UInt16),
            field("Language", UInt16),
            field("Country", UInt16),
            field("Info", string(34)),
        ],
    )?;

    b.define(
        "TW_IDENTITY",
        vec![
            field("Id", id_or_memref()),
            field("Version", record("TW_VERSION")),
            field("ProtocolMajor", UInt16),
            field("ProtocolMinor", UInt16),
            field("SupportedGroups", UInt32),
            field("Manufacturer", string(34)),
            field("ProductFamily", string(34)),
            field("ProductName", string(34)),
        ],
    )?;

    b.define(
        "TW_IMAGEINFO",
        vec![
            field("XResolution", record("TW_FIX32")),
            field("YResolution", record("TW_FIX32")),
            field("ImageWidth", Int32),
            field("ImageLength", Int32),
            field("SamplesPerPixel", Int16),
            field("BitsPerSample", array(Int16, 8)),
            field("BitsPerPixel", Int16),
            field("Planar", Bool),
            field("PixelType", Int16),
            field("Compression", UInt16),
        ],
    )?;

    b.define(
        "TW_IMAGELAYOUT",
        vec![
            field("Frame", record("TW_FRAME")),
            field("DocumentNumber", UInt32),
            field("PageNumber", UInt32),
            field("FrameNumber", UInt32),
        ],
    )?;

    b.define(
        "TW_MEMORY",
        vec![
            field("Flags", UInt32),
            field("Length", UInt32),
            field("TheMem", MemRef),
        ],
    )?;

    b.define(
        "TW_IMAGEMEMXFER",
        vec![
            field("Compression", UInt16),
            field("BytesPerRow", UInt32),
            field("Columns", UInt32),
            field("Rows", UInt32),
            field("XOffset", UInt32),
            field("YOffset", UInt32),
            field("BytesWritten", UInt32),
            field("Memory", record("TW_MEMORY")),
        ],
    )?;

    b.define(
        "TW_JPEGCOMPRESSION",
        vec![
            field("ColorSpace", UInt16),
            field("SubSampling", UInt32),
            field("NumComponents", UInt16),
            field("RestartFrequency", UInt16),
            field("QuantMap", array(UInt16, 4)),
            field("QuantTable", array(record("TW_MEMORY"), 4)),
            field("HuffmanMap", array(UInt16, 4)),
            field("HuffmanDC", array(record("TW_MEMORY"), 2)),
            field("HuffmanAC", array(record("TW_MEMORY"), 2)),
        ],
    )?;

    b.define(
        "TW_METRICS",
        vec![
            field("SizeOf", UInt32),
            field("ImageCount", UInt32),
            field("SheetCount", UInt32),
        ],
    )?;

    b.define(
        "TW_ONEVALUE",
        vec![field("ItemType", UInt16), field("Item", UInt32)],
    )?;

    b.define(
        "TW_PALETTE8",
        vec![
            field("NumColors", UInt16),
            field("PaletteType", UInt16),
            field("Colors", array(record("TW_ELEMENT8"), 256)),
        ],
    )?;

    b.define(
        "TW_PASSTHRU",
        vec![
            field("pCommand", MemRef),
            field("CommandBytes", UInt32),
            field("Direction", Int32),
            field("pData", MemRef),
            field("DataBytes", UInt32),
            field("DataBytesXfered", UInt32),
        ],
    )?;

    b.define(
        "TW_PENDINGXFERS",
        vec![
            field("Count", UInt16),
            field(
                "UnionEOJ",
                union(vec![field("EOJ", UInt32), field("Reserved", UInt32)]),
            ),
        ],
    )?;

    b.define(
        "TW_RANGE",
        vec![
            field("ItemType", UInt16),
            field("MinValue", UInt32),
            field("MaxValue", UInt32),
            field("StepSize", UInt32),
            field("DefaultValue", UInt32),
            field("CurrentValue", UInt32),
        ],
    )?;

    b.define(
        "TW_RGBRESPONSE",
        vec![field("Response", array(record("TW_ELEMENT8"), 1))],
    )?;

    b.define(
        "TW_SETUPFILEXFER",
        vec![
            field("FileName", string(256)),
            field("Format", UInt16),
            field("VRefNum", Int16),
        ],
    )?;

    b.define(
        "TW_SETUPMEMXFER",
        vec![
            field("MinBufSize", UInt32),
            field("MaxBufSize", UInt32),
            field("Preferred", UInt32),
        ],
    )?;

    b.define(
        "TW_STATUS",
        vec![
            field("ConditionCode", UInt16),
            field(
                "Union",
                union(vec![field("Data", UInt16), field("Reserved", UInt16)]),
            ),
        ],
    )?;

    b.define(
        "TW_STATUSUTF8",
        vec![
            field("Status", record("TW_STATUS")),
            field("Size", UInt32),
            field("UTF8string", Handle),
        ],
    )?;

    b.define(
        "TW_TWAINDIRECT",
        vec![
            field("SizeOf", UInt32),
            field("CommunicationManager", UInt16),
            field("Send", Handle),
            field("SendSize", UInt32),
            field("Receive", Handle),
            field("ReceiveSize", UInt32),
        ],
    )?;

    b.define(
        "TW_USERINTERFACE",
        vec![
            field("ShowUI", Bool),
            field("ModalUI", Bool),
            field("hParent", Handle),
        ],
    )?;

    b.define(
        "TW_ENTRYPOINT",
        vec![
            field("Size", UInt32),
            field("DSM_Entry", EntryProc),
            field("DSM_MemAllocate", EntryProc),
            field("DSM_MemFree", EntryProc),
            field("DSM_MemLock", EntryProc),
            field("DSM_MemUnlock", EntryProc),
        ],
    )?;

    b.define(
        "TW_FILTER_DESCRIPTOR",
        [
            "Size",
            "HueStart",
            "HueEnd",
            "SaturationStart",
            "SaturationEnd",
            "ValueStart",
            "ValueEnd",
            "Replacement",
        ]
        .into_iter()
        .map(|name| field(name, UInt32))
        .collect(),
    )?;

    b.define(
        "TW_FILTER",
        vec![
            field("Size", UInt32),
            field("DescriptorCount", UInt32),
            field("MaxDescriptorCount", UInt32),
            field("Condition", UInt32),
            field("hDescriptors", Handle),
        ],
    )?;

    Ok(())
}
