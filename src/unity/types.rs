#![allow(non_snake_case)]

use rabex::objects::pptr::PPtr;
use rabex::objects::{ClassId, ClassIdType};
use serde_derive::{Deserialize, Serialize};

/// The fields every script component starts with.
/// DBF tables are `MonoBehaviour`s whose remaining fields come from the type tree.
#[derive(Debug, Serialize, Deserialize)]
pub struct MonoBehaviour {
    pub m_GameObject: PPtr,
    pub m_Enabled: u8,
    pub m_Script: PPtr,
    pub m_Name: String,
}
impl ClassIdType for MonoBehaviour {
    const CLASS_ID: ClassId = ClassId::MonoBehaviour;
}
