use crate::model::Id;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct StudentMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct TeacherMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct LearningElementMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct GroupMarker;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct Student {
    pub id: Id<StudentMarker>,
    pub name: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct Teacher {
    pub id: Id<TeacherMarker>,
    pub name: String,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningElementKind {
    Lesson,
    Assignment,
}

/// A lesson or assignment a post can reference.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub struct LearningElement {
    pub id: Id<LearningElementMarker>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LearningElementKind,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct Group {
    pub id: Id<GroupMarker>,
    pub name: String,
}

/// Everything a post can be tagged with, plus the group the feed belongs to.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct Catalog {
    pub group: Group,
    pub students: Vec<Student>,
    pub teachers: Vec<Teacher>,
    pub learning_elements: Vec<LearningElement>,
}

impl Catalog {
    #[must_use]
    pub fn student(&self, id: &Id<StudentMarker>) -> Option<&Student> {
        self.students.iter().find(|student| &student.id == id)
    }

    #[must_use]
    pub fn teacher(&self, id: &Id<TeacherMarker>) -> Option<&Teacher> {
        self.teachers.iter().find(|teacher| &teacher.id == id)
    }

    #[must_use]
    pub fn learning_element(&self, id: &Id<LearningElementMarker>) -> Option<&LearningElement> {
        self.learning_elements
            .iter()
            .find(|element| &element.id == id)
    }
}
