//! # Block Model
//!
//! Value types for every block variant. A [`Block`] is the owned payload
//! handed to the tree (and returned when a subtree is materialized); the tree
//! itself stores [`BlockKind`] values in its arena.
//!
//! Whether a block carries `children` is decided by its [`BlockType`] alone:
//!
//! | type | container |
//! |------|-----------|
//! | `text`, `heading`, `quote`, `code`, `divider` | no |
//! | `toggleList`, `callout`, `bulletList`, `numberedList`, `todoList` | yes |

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// ID of the distinguished document root
pub const ROOT_ID: &str = "root";

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 2 * 1024 * 1024;

/// Run one level of a recursive tree walk, growing the stack when it runs low
pub(crate) fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, f)
}

/// Closed set of block variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockType {
    Text,
    Heading,
    Quote,
    Code,
    Divider,
    ToggleList,
    Callout,
    BulletList,
    NumberedList,
    TodoList,
}

impl BlockType {
    pub const ALL: [BlockType; 10] = [
        BlockType::Text,
        BlockType::Heading,
        BlockType::Quote,
        BlockType::Code,
        BlockType::Divider,
        BlockType::ToggleList,
        BlockType::Callout,
        BlockType::BulletList,
        BlockType::NumberedList,
        BlockType::TodoList,
    ];

    /// Type tag as it appears in document JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::Heading => "heading",
            BlockType::Quote => "quote",
            BlockType::Code => "code",
            BlockType::Divider => "divider",
            BlockType::ToggleList => "toggleList",
            BlockType::Callout => "callout",
            BlockType::BulletList => "bulletList",
            BlockType::NumberedList => "numberedList",
            BlockType::TodoList => "todoList",
        }
    }

    /// Parse a type tag, `None` for anything outside the closed set
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == tag)
    }

    /// Whether blocks of this type own a `children` list
    pub fn can_have_children(&self) -> bool {
        match self {
            BlockType::Text
            | BlockType::Heading
            | BlockType::Quote
            | BlockType::Code
            | BlockType::Divider => false,
            BlockType::ToggleList
            | BlockType::Callout
            | BlockType::BulletList
            | BlockType::NumberedList
            | BlockType::TodoList => true,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Heading level, restricted to 1..=3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl TryFrom<u8> for HeadingLevel {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(HeadingLevel::H1),
            2 => Ok(HeadingLevel::H2),
            3 => Ok(HeadingLevel::H3),
            other => Err(format!("heading level must be 1, 2 or 3, got {}", other)),
        }
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> Self {
        match level {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextData {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeadingData {
    pub text: String,
    pub level: HeadingLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodeData {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DividerData {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToggleData {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalloutData {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TodoData {
    pub text: String,
    pub checked: bool,
}

/// Variant tag plus its validated data payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Text(TextData),
    Heading(HeadingData),
    Quote(TextData),
    Code(CodeData),
    Divider(DividerData),
    ToggleList(ToggleData),
    Callout(CalloutData),
    BulletList(TextData),
    NumberedList(TextData),
    TodoList(TodoData),
}

impl BlockKind {
    pub fn text(text: impl Into<String>) -> Self {
        BlockKind::Text(TextData { text: text.into() })
    }

    pub fn heading(text: impl Into<String>, level: HeadingLevel) -> Self {
        BlockKind::Heading(HeadingData {
            text: text.into(),
            level,
        })
    }

    pub fn quote(text: impl Into<String>) -> Self {
        BlockKind::Quote(TextData { text: text.into() })
    }

    pub fn code(code: impl Into<String>, language: Option<String>) -> Self {
        BlockKind::Code(CodeData {
            code: code.into(),
            language,
        })
    }

    pub fn divider() -> Self {
        BlockKind::Divider(DividerData {})
    }

    pub fn toggle_list(text: impl Into<String>) -> Self {
        BlockKind::ToggleList(ToggleData {
            text: text.into(),
            open: None,
        })
    }

    pub fn callout(text: impl Into<String>, icon: Option<String>) -> Self {
        BlockKind::Callout(CalloutData {
            text: text.into(),
            icon,
        })
    }

    pub fn bullet_list(text: impl Into<String>) -> Self {
        BlockKind::BulletList(TextData { text: text.into() })
    }

    pub fn numbered_list(text: impl Into<String>) -> Self {
        BlockKind::NumberedList(TextData { text: text.into() })
    }

    pub fn todo_list(text: impl Into<String>, checked: bool) -> Self {
        BlockKind::TodoList(TodoData {
            text: text.into(),
            checked,
        })
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            BlockKind::Text(_) => BlockType::Text,
            BlockKind::Heading(_) => BlockType::Heading,
            BlockKind::Quote(_) => BlockType::Quote,
            BlockKind::Code(_) => BlockType::Code,
            BlockKind::Divider(_) => BlockType::Divider,
            BlockKind::ToggleList(_) => BlockType::ToggleList,
            BlockKind::Callout(_) => BlockType::Callout,
            BlockKind::BulletList(_) => BlockType::BulletList,
            BlockKind::NumberedList(_) => BlockType::NumberedList,
            BlockKind::TodoList(_) => BlockType::TodoList,
        }
    }

    pub fn can_have_children(&self) -> bool {
        self.block_type().can_have_children()
    }

    /// Build a kind from a type tag and its raw `data` object
    ///
    /// A missing (`null`) data payload is read as `{}`, which only the
    /// divider accepts.
    pub fn from_parts(block_type: BlockType, data: Value) -> Result<Self, serde_json::Error> {
        let data = match data {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        Ok(match block_type {
            BlockType::Text => BlockKind::Text(serde_json::from_value(data)?),
            BlockType::Heading => BlockKind::Heading(serde_json::from_value(data)?),
            BlockType::Quote => BlockKind::Quote(serde_json::from_value(data)?),
            BlockType::Code => BlockKind::Code(serde_json::from_value(data)?),
            BlockType::Divider => BlockKind::Divider(serde_json::from_value(data)?),
            BlockType::ToggleList => BlockKind::ToggleList(serde_json::from_value(data)?),
            BlockType::Callout => BlockKind::Callout(serde_json::from_value(data)?),
            BlockType::BulletList => BlockKind::BulletList(serde_json::from_value(data)?),
            BlockType::NumberedList => BlockKind::NumberedList(serde_json::from_value(data)?),
            BlockType::TodoList => BlockKind::TodoList(serde_json::from_value(data)?),
        })
    }

    /// Serializable view of the `data` payload only
    pub fn data(&self) -> KindData<'_> {
        KindData(self)
    }
}

/// Serializes the `data` object of a [`BlockKind`]
pub struct KindData<'a>(&'a BlockKind);

impl Serialize for KindData<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            BlockKind::Text(data)
            | BlockKind::Quote(data)
            | BlockKind::BulletList(data)
            | BlockKind::NumberedList(data) => data.serialize(serializer),
            BlockKind::Heading(data) => data.serialize(serializer),
            BlockKind::Code(data) => data.serialize(serializer),
            BlockKind::Divider(data) => data.serialize(serializer),
            BlockKind::ToggleList(data) => data.serialize(serializer),
            BlockKind::Callout(data) => data.serialize(serializer),
            BlockKind::TodoList(data) => data.serialize(serializer),
        }
    }
}

/// Owned block value (payloads and materialized subtrees)
///
/// Serialized field order is fixed: `id, parentId, type, data, children?`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawBlock")]
pub struct Block {
    pub id: String,
    pub parent_id: String,
    pub kind: BlockKind,
    pub children: Option<Vec<Block>>,
}

impl Block {
    /// Create a block with no parent link and no children
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            parent_id: String::new(),
            kind,
            children: None,
        }
    }

    /// Attach a children list
    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    pub fn can_have_children(&self) -> bool {
        self.kind.can_have_children()
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.children.is_some() { 5 } else { 4 };
        let mut state = serializer.serialize_struct("Block", len)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("parentId", &self.parent_id)?;
        state.serialize_field("type", &self.kind.block_type())?;
        state.serialize_field("data", &self.kind.data())?;
        if let Some(children) = &self.children {
            with_stack(|| state.serialize_field("children", children))?;
        }
        state.end()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    id: String,
    #[serde(default)]
    parent_id: String,
    #[serde(rename = "type")]
    block_type: BlockType,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    children: Option<Vec<Block>>,
}

impl TryFrom<RawBlock> for Block {
    type Error = String;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        let kind = BlockKind::from_parts(raw.block_type, raw.data)
            .map_err(|e| format!("invalid {} data: {}", raw.block_type, e))?;

        Ok(Block {
            id: raw.id,
            parent_id: raw.parent_id,
            kind,
            children: raw.children,
        })
    }
}

/// Owned form of the whole document: `{ id: "root", children: [...] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRoot {
    #[serde(default = "default_root_id")]
    pub id: String,
    pub children: Vec<Block>,
}

fn default_root_id() -> String {
    ROOT_ID.to_string()
}

impl DocumentRoot {
    pub fn new(children: Vec<Block>) -> Self {
        Self {
            id: default_root_id(),
            children,
        }
    }
}

impl Default for DocumentRoot {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
