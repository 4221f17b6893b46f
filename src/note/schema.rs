use crate::types::Jcid;
use num_enum::TryFromPrimitive;

macro_rules! property_ids {
    ($($name:ident = $value:literal / $verbosity:literal,)+) => {
        /// Known property identities ([MS-ONE] §2.1.12).
        ///
        /// Values are the full property header word without the value
        /// bit, so they carry the data type bits alongside the 26-bit id.
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, TryFromPrimitive)]
        #[repr(u32)]
        pub enum PropertyId {
            $($name = $value,)+
        }

        impl PropertyId {
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)+
                }
            }

            /// Minimum verbosity at which the property is shown;
            /// 0 means always.
            pub fn min_verbosity(self) -> u8 {
                match self {
                    $(Self::$name => $verbosity,)+
                }
            }
        }
    };
}

property_ids! {
    LayoutTightLayout = 0x08001C00 / 2,
    PageWidth = 0x14001C01 / 2,
    PageHeight = 0x14001C02 / 2,
    OutlineElementChildLevel = 0x0C001C03 / 1,
    Bold = 0x08001C04 / 0,
    Italic = 0x08001C05 / 0,
    Underline = 0x08001C06 / 0,
    Strikethrough = 0x08001C07 / 0,
    Superscript = 0x08001C08 / 0,
    Subscript = 0x08001C09 / 0,
    Font = 0x1C001C0A / 1,
    FontSize = 0x10001C0B / 1,
    FontColor = 0x14001C0C / 1,
    Highlight = 0x14001C0D / 1,
    RgOutlineIndentDistance = 0x1C001C12 / 2,
    BodyTextAlignment = 0x0C001C13 / 2,
    OffsetFromParentHoriz = 0x14001C14 / 2,
    OffsetFromParentVert = 0x14001C15 / 2,
    NumberListFormat = 0x1C001C1A / 0,
    LayoutMaxWidth = 0x14001C1B / 2,
    LayoutMaxHeight = 0x14001C1C / 2,
    ContentChildNodes = 0x24001C1F / 0,
    ElementChildNodes = 0x24001C20 / 0,
    EnableHistory = 0x08001E1E / 3,
    RichEditTextUnicode = 0x1C001C22 / 0,
    ListNodes = 0x24001C26 / 0,
    NotebookManagementEntityGuid = 0x1C001C30 / 1,
    OutlineElementRTL = 0x08001C34 / 1,
    LanguageID = 0x14001C3B / 1,
    LayoutAlignmentInParent = 0x14001C3E / 2,
    PictureContainer = 0x20001C3F / 0,
    PageMarginTop = 0x14001C4C / 2,
    PageMarginBottom = 0x14001C4D / 2,
    PageMarginLeft = 0x14001C4E / 2,
    PageMarginRight = 0x14001C4F / 2,
    ListFont = 0x1C001C52 / 1,
    TopologyCreationTimeStamp = 0x18001C65 / 3,
    LayoutAlignmentSelf = 0x14001C84 / 2,
    IsTitleTime = 0x08001C87 / 1,
    IsBoilerText = 0x08001C88 / 1,
    PageSize = 0x14001C8B / 2,
    PortraitPage = 0x08001C8E / 2,
    EnforceOutlineStructure = 0x08001C91 / 3,
    EditRootRTL = 0x08001C92 / 1,
    AudioRecordingGuid = 0x1C001C97 / 1,
    AudioRecordingGuids = 0x1C001CA3 / 1,
    CannotBeSelected = 0x08001CB2 / 3,
    IsTitleText = 0x08001CB4 / 1,
    IsTitleDate = 0x08001CB5 / 1,
    ListRestart = 0x14001CB7 / 1,
    NotebookElementOrderingID = 0x14001CB9 / 3,
    IsLayoutSizeSetByUser = 0x08001CBD / 3,
    NotebookColor = 0x14001CBE / 1,
    ListSpacingMu = 0x14001CCB / 2,
    AsciiNumberListFormat = 0x1C001CDA / 2,
    LayoutOutlineReservedWidth = 0x14001CDB / 2,
    LayoutResolveChildCollisions = 0x08001CDC / 3,
    IsReadOnly = 0x08001CDE / 3,
    NoteOnlineParagraphStyle = 0x20001CE2 / 0,
    LayoutMinimumOutlineWidth = 0x14001CEC / 2,
    LayoutCollisionPriority = 0x14001CF1 / 3,
    CachedTitleString = 0x1C001CF3 / 0,
    TocEntryIndex = 0x24001CF6 / 3,
    DescendantsCannotBeMoved = 0x08001CF9 / 3,
    AudioRecordingDuration = 0x14001CFD / 1,
    RichEditTextLangID = 0x10001CFE / 1,
    LayoutTightAlignment = 0x08001CFF / 2,
    Charset = 0x0C001D01 / 1,
    CreationTimeStamp = 0x14001D09 / 1,
    Deletable = 0x08001D0C / 3,
    ListMSAAIndex = 0x10001D0E / 3,
    PageMarginOriginX = 0x14001D0F / 2,
    PageMarginOriginY = 0x14001D10 / 2,
    IsBackground = 0x08001D13 / 2,
    IRecordMedia = 0x14001D24 / 1,
    CachedTitleStringFromPage = 0x1C001D3C / 0,
    RowCount = 0x14001D57 / 0,
    ColumnCount = 0x14001D58 / 0,
    TableBordersVisible = 0x08001D5E / 1,
    StructureElementChildNodes = 0x24001D5F / 0,
    ChildGraphSpaceElementNodes = 0x2C001D63 / 0,
    TableColumnWidths = 0x1C001D66 / 2,
    FolderChildFilename = 0x1C001D6B / 0,
    NotebookSectionName = 0x1C001D69 / 0,
    Author = 0x1C001D75 / 0,
    LastModifiedTimeStamp = 0x18001D77 / 1,
    AuthorOriginal = 0x20001D78 / 1,
    AuthorMostRecent = 0x20001D79 / 1,
    LastModifiedTime = 0x14001D7A / 1,
    IsConflictPage = 0x08001D7C / 1,
    TableColumnsLocked = 0x1C001D7D / 2,
    SchemaRevisionInOrderToRead = 0x14001D82 / 3,
    FileIdentityGuid = 0x1C001D94 / 1,
    IsConflictObjectForRender = 0x08001D96 / 3,
    HasConflictPages = 0x08001D97 / 1,
    EmbeddedFileContainer = 0x20001D9B / 0,
    EmbeddedFileName = 0x1C001D9C / 0,
    SourceFilepath = 0x1C001D9D / 1,
    ConflictingUserName = 0x1C001D9E / 1,
    ConflictingUserInitials = 0x1C001D9F / 1,
    ImageFilename = 0x1C001DD7 / 0,
    IsConflictObjectForSelection = 0x08001DDB / 3,
    IsDeletedGraphSpaceContent = 0x1C001DE9 / 3,
    AuthorInitials = 0x1C001DF8 / 1,
    PageLevel = 0x14001DFF / 0,
    TextRunIndex = 0x1C001E12 / 2,
    TextRunFormatting = 0x24001E13 / 2,
    Hyperlink = 0x08001E14 / 1,
    UnderlineType = 0x0C001E15 / 1,
    Hidden = 0x08001E16 / 1,
    HyperlinkProtected = 0x08001E19 / 1,
    WzHyperlinkUrl = 0x1C001E20 / 0,
    TextRunIsEmbeddedObject = 0x08001E22 / 2,
    CellShadingColor = 0x14001E26 / 1,
    ImageAltText = 0x1C001E58 / 0,
    MathFormatting = 0x08003401 / 1,
    ParagraphStyle = 0x2000342C / 0,
    ParagraphSpaceBefore = 0x1400342E / 2,
    ParagraphSpaceAfter = 0x1400342F / 2,
    ParagraphLineSpacingExact = 0x14003430 / 2,
    MetaDataObjectsAboveGraphSpace = 0x24003442 / 3,
    TextRunDataObject = 0x24003458 / 2,
    TextExtendedAscii = 0x1C003498 / 0,
    TextRunData = 0x40003499 / 2,
    ParagraphStyleId = 0x1C00345A / 1,
    HasVersionPages = 0x08003462 / 1,
    ActionItemType = 0x10003463 / 1,
    NoteTagShape = 0x10003464 / 1,
    NoteTagHighlightColor = 0x14003465 / 1,
    NoteTagTextColor = 0x14003466 / 1,
    NoteTagPropertyStatus = 0x14003467 / 1,
    NoteTagLabel = 0x1C003468 / 0,
    TaskTagDueDate = 0x1400346B / 1,
    NoteTagCreated = 0x1400346E / 1,
    NoteTagCompleted = 0x1400346F / 1,
    ActionItemStatus = 0x10003470 / 1,
    ActionItemSchemaVersion = 0x0C003473 / 3,
    ReadingOrderRTL = 0x08003476 / 1,
    ParagraphAlignment = 0x0C003477 / 2,
    VersionHistoryGraphSpaceContextNodes = 0x3400347B / 1,
    DisplayedPageNumber = 0x14003480 / 1,
    NoteTagDefinitionOid = 0x20003488 / 0,
    NoteTagStates = 0x04003489 / 1,
    NextStyle = 0x1C00348A / 2,
    SchemaRevisionInOrderToWrite = 0x1400348B / 3,
    SectionDisplayName = 0x1C00349B / 0,
    WebPictureContainer14 = 0x200034C8 / 0,
    ImageUploadState = 0x140034CB / 3,
    PictureWidth = 0x140034CD / 1,
    PictureHeight = 0x140034CE / 1,
    PredefinedParagraphStyles = 0x240034D8 / 4,
}

impl PropertyId {
    /// Look a raw property id (header word without the value bit) up in
    /// the known set.
    pub fn from_raw(id: u32) -> Option<Self> {
        Self::try_from(id).ok()
    }

    /// Whether the property's byte payload holds UTF-16 text.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Self::Author
                | Self::AuthorInitials
                | Self::CachedTitleString
                | Self::CachedTitleStringFromPage
                | Self::ConflictingUserInitials
                | Self::ConflictingUserName
                | Self::EmbeddedFileName
                | Self::FolderChildFilename
                | Self::Font
                | Self::ImageAltText
                | Self::ImageFilename
                | Self::ListFont
                | Self::NoteTagLabel
                | Self::NotebookSectionName
                | Self::NumberListFormat
                | Self::ParagraphStyleId
                | Self::SectionDisplayName
                | Self::SourceFilepath
                | Self::WzHyperlinkUrl
        )
    }

    /// Whether the property's byte payload holds a single GUID.
    pub fn is_guid(self) -> bool {
        matches!(
            self,
            Self::NotebookManagementEntityGuid | Self::FileIdentityGuid | Self::AudioRecordingGuid
        )
    }

    /// Whether the property's inline integer is a FILETIME.
    pub fn is_filetime(self) -> bool {
        matches!(
            self,
            Self::LastModifiedTimeStamp | Self::TopologyCreationTimeStamp
        )
    }

    /// Whether the property's inline integer is a Time32.
    pub fn is_time32(self) -> bool {
        matches!(
            self,
            Self::CreationTimeStamp
                | Self::LastModifiedTime
                | Self::NoteTagCreated
                | Self::NoteTagCompleted
                | Self::TaskTagDueDate
        )
    }
}

/// Schema space a JCID resolves in. Section files use the notebook
/// space; table of contents files use a small disjoint space of their
/// own, with a nested space for the per-section descriptors.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum JcidSpace {
    Notebook,
    Toc,
    TocSection,
    NoteOnlineParagraphStyle,
}

impl JcidSpace {
    /// The space objects referenced from an object in this space
    /// resolve in.
    pub fn child_space(self) -> Self {
        match self {
            // The TOC root container's children are section descriptors.
            Self::Toc => Self::TocSection,
            other => other,
        }
    }
}

macro_rules! jcid_names {
    ($($name:ident = $value:literal,)+) => {
        /// Known notebook property set schemas.
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, TryFromPrimitive)]
        #[repr(u32)]
        pub enum NotebookJcid {
            $($name = $value,)+
        }

        impl NotebookJcid {
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)+
                }
            }
        }
    };
}

jcid_names! {
    ReadOnlyPersistablePropertyContainerForAuthor = 0x00120001,
    SectionNode = 0x00060007,
    PageSeriesNode = 0x00060008,
    PageNode = 0x0006000B,
    OutlineNode = 0x0006000C,
    OutlineElementNode = 0x0006000D,
    RichTextOENode = 0x0006000E,
    ImageNode = 0x00060011,
    NumberListNode = 0x00060012,
    OutlineGroup = 0x00060019,
    TableNode = 0x00060022,
    TableRowNode = 0x00060023,
    TableCellNode = 0x00060024,
    TitleNode = 0x0006002C,
    PageMetaData = 0x00020030,
    SectionMetaData = 0x00020031,
    EmbeddedFileNode = 0x00060035,
    EmbeddedFileContainer = 0x00080036,
    PageManifestNode = 0x00060037,
    ConflictPageMetaData = 0x00020038,
    PictureContainer14 = 0x00080039,
    VersionHistoryContent = 0x0006003C,
    VersionProxy = 0x0006003D,
    NoteTagSharedDefinitionContainer = 0x00120043,
    RevisionMetaData = 0x00020044,
    VersionHistoryMetaData = 0x00020046,
    ParagraphStyleObject = 0x0012004D,
    ReadOnlyAuthor = 0x00120051,
}

/// Symbolic name for a JCID within a schema space, when known.
pub fn jcid_name(space: JcidSpace, jcid: Jcid) -> Option<&'static str> {
    match space {
        JcidSpace::Notebook => NotebookJcid::try_from(jcid.0).ok().map(NotebookJcid::name),
        JcidSpace::Toc => {
            (jcid.0 == 0x00020001).then_some("PersistablePropertyContainerForTOC")
        }
        JcidSpace::TocSection => {
            (jcid.0 == 0x00020001).then_some("PersistablePropertyContainerForTOCSection")
        }
        JcidSpace::NoteOnlineParagraphStyle => {
            (jcid.0 == 0x00020001).then_some("NoteOnlineParagraphStyle")
        }
    }
}

/// The property whose minimum verbosity drives a child-bearing node.
pub fn child_nodes_property(space: JcidSpace, jcid: Jcid) -> Option<PropertyId> {
    if space != JcidSpace::Notebook {
        return None;
    }

    match NotebookJcid::try_from(jcid.0).ok()? {
        NotebookJcid::SectionNode
        | NotebookJcid::PageSeriesNode
        | NotebookJcid::PageNode
        | NotebookJcid::OutlineNode => Some(PropertyId::ElementChildNodes),
        NotebookJcid::OutlineElementNode | NotebookJcid::PageManifestNode => {
            Some(PropertyId::ContentChildNodes)
        }
        _ => None,
    }
}

/// Dictionary a read-only object deduplicates into when emitted.
pub fn read_only_kind(space: JcidSpace, jcid: Jcid) -> Option<&'static str> {
    if space == JcidSpace::NoteOnlineParagraphStyle {
        return Some("ParagraphStyles");
    }

    match NotebookJcid::try_from(jcid.0).ok()? {
        NotebookJcid::ReadOnlyPersistablePropertyContainerForAuthor
        | NotebookJcid::ReadOnlyAuthor => Some("Authors"),
        NotebookJcid::ParagraphStyleObject => Some("ParagraphStyles"),
        NotebookJcid::NoteTagSharedDefinitionContainer => Some("NoteTags"),
        _ => None,
    }
}
