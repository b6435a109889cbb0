//! Static catalogs and a randomly generated post collection used to seed the
//! feed.

use crate::model::{
    Id,
    catalog::{Catalog, Group, LearningElement, LearningElementKind, Student, Teacher},
    post::{POST_ID_PREFIX, Post, PostTags},
    user::Role,
};
use rand::{Rng, seq::IndexedRandom};
use time::{Duration, UtcDateTime};

pub const MOCK_POST_COUNT: usize = 95;
pub const MOCK_POST_MAX_AGE: Duration = Duration::days(30);

const GROUP_ID: &str = "group-7b";
const GROUP_NAME: &str = "Группа 7Б";

const STUDENT_NAMES: [&str; 47] = [
    "Алия Самигулова", "Армхан Темирбаев", "Диана Жарқынова", "Ерқен Мамбеков",
    "Асель Жарқынова", "Бекзат Жылқайдаров", "Гульмира Ибраимова", "Данияр Оспанов",
    "Есенғали Кенжебаев", "Айдос Сатыбалдин", "Лаура Ергалиева", "Маржан Сейтова",
    "Нарман Оспанов", "Раушан Жарқынова", "Сара Ермекова", "Темур Нурбаев",
    "Улан Сарсенбин", "Фарид Мухамеджан", "Халима Омарова", "Чигара Балова",
    "Шахзода Назарова", "Юлия Волкова", "Зульфия Искакова", "Адлет Молдабаев",
    "Ботакоз Ахметова", "Венера Садыкова", "Гиниятулла Аширов", "Дарья Петровна",
    "Елена Федорова", "Жанна Козлова", "Зарина Хасенова", "Икбал Саттарова",
    "Клара Шайхиева", "Лилия Карпова", "Майра Абдуллина", "Наталья Громова",
    "Оксана Лебедева", "Полина Сиротина", "Рузана Енбаева", "Сергей Иванов",
    "Таймас Кулманов", "Умбет Аманов", "Фатима Абдрахманова", "Халед Сафин",
    "Шермухамед Жаксыбаев", "Юнус Утегалиев", "Ясмина Хайдарова",
];

const TEACHER_NAMES: [&str; 7] = [
    "Айгүл Нурписова", "Аймура Даулетова", "Алмас Камалов", "Болат Адилов",
    "Венера Аскарова", "Гаухар Смагулова", "Давид Орлов",
];

const LESSON_NAMES: [&str; 17] = [
    "Экосистемы", "Биология", "Геометрия", "Простые механизмы", "Физика", "Химия",
    "История", "Литература", "Английский язык", "Информатика", "Музыка", "Физкультура",
    "Изобразительное искусство", "Технология", "Казахский язык", "География",
    "Обществознание",
];

const ASSIGNMENT_NAMES: [&str; 3] = [
    "Биологический проект", "Презентация проекта", "Командный проект",
];

const IMAGES: [&str; 10] = [
    "/students-presenting-project-in-classroom.jpg",
    "/group-of-students-working-together-on-biology-proj.jpg",
    "/student-explaining-math-on-whiteboard.jpg",
    "/scientific-experiment-in-chemistry-lab.jpg",
    "/students-building-physics-project-prototype.jpg",
    "/historical-documentary-presentation.jpg",
    "/literature-discussion-group.jpg",
    "/english-language-performance.jpg",
    "/computer-programming-class.jpg",
    "/orchestra-students-performing.jpg",
];

const TITLES: [&str; 10] = [
    "Успешно завершена презентация по биологии",
    "Проект по физике готов к защите",
    "Отличная работа в командном проекте",
    "Внимательное решение заданий по геометрии",
    "Творческий подход к истории",
    "Прекрасное понимание литературного произведения",
    "Успех в контрольной работе",
    "Отличная подготовка к экзамену",
    "Решение сложной задачи по химии",
    "Творческий проект по искусству",
];

const DESCRIPTIONS: [&str; 10] = [
    "Ученик продемонстрировал глубокое понимание темы и уверенно ответил на все вопросы",
    "Группа работала слаженно и выполнила проект в срок с высоким качеством",
    "Инновативный подход к решению проблемы впечатлил всех",
    "Отличная подготовка и уверенная защита проекта",
    "Ученик активно участвовал и помогал одноклассникам",
    "Показан значительный прогресс в учении",
    "Творческий и оригинальный результат",
    "Внимательное изучение материала привело к отличному результату",
    "Взаимопомощь в команде привела к успеху",
    "Примечательное улучшение по сравнению с предыдущей работой",
];

#[must_use]
pub fn students() -> Vec<Student> {
    STUDENT_NAMES
        .iter()
        .enumerate()
        .map(|(idx, name)| Student {
            id: Id::new(format!("student-{}", idx + 1)),
            name: (*name).to_owned(),
        })
        .collect()
}

#[must_use]
pub fn teachers() -> Vec<Teacher> {
    TEACHER_NAMES
        .iter()
        .enumerate()
        .map(|(idx, name)| Teacher {
            id: Id::new(format!("teacher-{}", idx + 1)),
            name: (*name).to_owned(),
        })
        .collect()
}

#[must_use]
pub fn learning_elements() -> Vec<LearningElement> {
    let lessons = LESSON_NAMES
        .iter()
        .map(|name| (name, LearningElementKind::Lesson));
    let assignments = ASSIGNMENT_NAMES
        .iter()
        .map(|name| (name, LearningElementKind::Assignment));

    lessons
        .chain(assignments)
        .enumerate()
        .map(|(idx, (name, kind))| LearningElement {
            id: Id::new(format!("le-{}", idx + 1)),
            name: (*name).to_owned(),
            kind,
        })
        .collect()
}

#[must_use]
pub fn catalog() -> Catalog {
    Catalog {
        group: Group {
            id: Id::new(GROUP_ID),
            name: GROUP_NAME.to_owned(),
        },
        students: students(),
        teachers: teachers(),
        learning_elements: learning_elements(),
    }
}

/// Generates [`MOCK_POST_COUNT`] posts created within [`MOCK_POST_MAX_AGE`]
/// before `now`, newest first.
///
/// Even posts are written by teachers and odd ones by students. Every post
/// is tagged with one to three students and one or two learning elements, and
/// sometimes with a teacher. A catalog without teachers or without students
/// yields no posts.
pub fn generate_posts<R: Rng + ?Sized>(
    catalog: &Catalog,
    rng: &mut R,
    now: UtcDateTime,
) -> Vec<Post> {
    if catalog.teachers.is_empty() || catalog.students.is_empty() {
        return Vec::new();
    }

    let max_age_millis = i64::try_from(MOCK_POST_MAX_AGE.whole_milliseconds()).unwrap_or(i64::MAX);

    let mut posts: Vec<Post> = (0..MOCK_POST_COUNT)
        .map(|i| {
            let (author_id, author_name, author_type) = if i % 2 == 0 {
                let teacher = &catalog.teachers[i % catalog.teachers.len()];
                (teacher.id.get(), &teacher.name, Role::Teacher)
            } else {
                let student = &catalog.students[i % catalog.students.len()];
                (student.id.get(), &student.name, Role::Student)
            };

            let mut students = Vec::new();
            for _ in 0..rng.random_range(1..=3) {
                if let Some(student) = catalog.students.choose(rng)
                    && !students.contains(&student.id)
                {
                    students.push(student.id.clone());
                }
            }

            let teachers = if rng.random_bool(0.4) {
                catalog
                    .teachers
                    .choose(rng)
                    .map(|teacher| teacher.id.clone())
                    .into_iter()
                    .collect()
            } else {
                Vec::new()
            };

            let mut learning_elements = Vec::new();
            for _ in 0..rng.random_range(1..=2) {
                if let Some(element) = catalog.learning_elements.choose(rng)
                    && !learning_elements.contains(&element.id)
                {
                    learning_elements.push(element.id.clone());
                }
            }

            Post {
                id: Id::new(format!("{POST_ID_PREFIX}-{}", i + 1)),
                title: (*TITLES.choose(rng).unwrap_or(&TITLES[0])).to_owned(),
                description: (*DESCRIPTIONS.choose(rng).unwrap_or(&DESCRIPTIONS[0])).to_owned(),
                image_url: IMAGES[i % IMAGES.len()].to_owned(),
                author_id: Id::new(author_id),
                author_name: author_name.clone(),
                author_type,
                created_at: now - Duration::milliseconds(rng.random_range(0..max_age_millis)),
                tags: PostTags {
                    students,
                    teachers,
                    learning_elements,
                },
            }
        })
        .collect();

    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}

#[cfg(test)]
mod tests {
    use crate::mock::{MOCK_POST_COUNT, MOCK_POST_MAX_AGE, catalog, generate_posts};
    use crate::model::{
        catalog::{Catalog, LearningElementKind},
        user::Role,
    };
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;
    use time::macros::utc_datetime;

    #[test]
    fn catalog_contents() {
        let catalog = catalog();

        assert_eq!(catalog.students.len(), 47);
        assert_eq!(catalog.teachers.len(), 7);
        assert_eq!(catalog.learning_elements.len(), 20);
        assert_eq!(catalog.group.id.get(), "group-7b");
        assert_eq!(catalog.students[0].id.get(), "student-1");
        assert_eq!(catalog.teachers[6].id.get(), "teacher-7");

        let assignments: Vec<_> = catalog
            .learning_elements
            .iter()
            .filter(|element| element.kind == LearningElementKind::Assignment)
            .map(|element| element.id.get())
            .collect();
        assert_eq!(assignments, ["le-18", "le-19", "le-20"]);
    }

    #[test]
    fn generated_posts() {
        let catalog = catalog();
        let now = utc_datetime!(2025-10-24 10:55);
        let posts = generate_posts(&catalog, &mut StdRng::seed_from_u64(7), now);

        assert_eq!(posts.len(), MOCK_POST_COUNT);

        let ids: HashSet<_> = posts.iter().map(|post| &post.id).collect();
        assert_eq!(ids.len(), MOCK_POST_COUNT);

        assert!(posts.windows(2).all(|pair| pair[0].created_at >= pair[1].created_at));

        for post in &posts {
            assert!(post.created_at <= now && post.created_at >= now - MOCK_POST_MAX_AGE);
            assert!((1..=3).contains(&post.tags.students.len()));
            assert!(post.tags.teachers.len() <= 1);
            assert!((1..=2).contains(&post.tags.learning_elements.len()));
            assert_eq!(Role::from_id_prefix(&post.author_id), Some(post.author_type));
            assert!(post.tags.students.iter().all(|id| catalog.student(id).is_some()));
        }
    }

    #[test]
    fn alternating_authorship() {
        let catalog = catalog();
        let posts = generate_posts(
            &catalog,
            &mut StdRng::seed_from_u64(1),
            utc_datetime!(2025-10-24 10:55),
        );

        let first = posts.iter().find(|post| post.id.get() == "post-1").unwrap();
        assert_eq!(first.author_id.get(), "teacher-1");
        assert_eq!(first.author_name, "Айгүл Нурписова");

        let second = posts.iter().find(|post| post.id.get() == "post-2").unwrap();
        assert_eq!(second.author_id.get(), "student-2");
        assert_eq!(second.author_type, Role::Student);
    }

    #[test]
    fn incomplete_catalog_yields_no_posts() {
        let now = utc_datetime!(2025-10-24 10:55);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(generate_posts(&Catalog::default(), &mut rng, now).is_empty());

        let no_teachers = Catalog {
            teachers: Vec::new(),
            ..catalog()
        };
        assert!(generate_posts(&no_teachers, &mut rng, now).is_empty());
    }
}
