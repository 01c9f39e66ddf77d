use uuid::Uuid;

use portal_domain::pagination::PageRequest;
use portal_mentorship::error::PortalServiceError;
use portal_mentorship::usecase::program::{
    CreateProgramInput, CreateProgramUseCase, DeleteProgramUseCase, ProgramCatalog,
    UpdateProgramInput, UpdateProgramUseCase,
};

use crate::helpers::{MemoryRepo, staff, student};

fn input(name: &str) -> CreateProgramInput {
    CreateProgramInput {
        name: name.to_owned(),
        description: format!("{name} at the college"),
        video_url: Some("https://cdn.portal.test/intro.mp4".to_owned()),
        image_url: None,
        brochure_url: Some("https://cdn.portal.test/brochure.pdf".to_owned()),
    }
}

#[tokio::test]
async fn should_list_programs_created_by_staff_in_creation_order() {
    let repo = MemoryRepo::new();
    let admin = repo.add_staff("director@portal.test");
    let create = CreateProgramUseCase {
        programs: repo.clone(),
    };
    create.execute(staff(admin), input("MBA")).await.unwrap();
    create.execute(staff(admin), input("MCA")).await.unwrap();

    let catalog = ProgramCatalog {
        programs: repo.clone(),
    };
    let names: Vec<String> = catalog
        .list(PageRequest::new(None, None))
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["MBA", "MCA"]);

    let second = catalog.list(PageRequest::new(Some(1), Some(2))).await.unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].name, "MCA");
}

#[tokio::test]
async fn should_show_program_detail_to_students() {
    let repo = MemoryRepo::new();
    let admin = repo.add_staff("director@portal.test");
    let asha = repo.add_student("Asha");
    let created = CreateProgramUseCase {
        programs: repo.clone(),
    }
    .execute(staff(admin), input("MBA"))
    .await
    .unwrap();

    let catalog = ProgramCatalog {
        programs: repo.clone(),
    };
    let shown = catalog.get(created.id).await.unwrap();
    assert_eq!(shown, created);

    let result = CreateProgramUseCase {
        programs: repo.clone(),
    }
    .execute(student(asha), input("MSc"))
    .await;
    assert!(matches!(result, Err(PortalServiceError::Forbidden)));
    assert_eq!(repo.world().programs.len(), 1);
}

#[tokio::test]
async fn should_edit_then_delete_program() {
    let repo = MemoryRepo::new();
    let admin = repo.add_staff("director@portal.test");
    let created = CreateProgramUseCase {
        programs: repo.clone(),
    }
    .execute(staff(admin), input("MBA"))
    .await
    .unwrap();

    let updated = UpdateProgramUseCase {
        programs: repo.clone(),
    }
    .execute(
        staff(admin),
        created.id,
        UpdateProgramInput {
            name: Some("MBA (Finance)".to_owned()),
            description: None,
            video_url: Some(None),
            image_url: Some(Some("https://cdn.portal.test/mba.png".to_owned())),
            brochure_url: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "MBA (Finance)");
    assert_eq!(updated.video_url, None);
    assert_eq!(updated.brochure_url, created.brochure_url);

    let delete = DeleteProgramUseCase {
        programs: repo.clone(),
    };
    delete.execute(staff(admin), created.id).await.unwrap();
    assert!(repo.world().programs.is_empty());

    let result = ProgramCatalog {
        programs: repo.clone(),
    }
    .get(created.id)
    .await;
    assert!(matches!(result, Err(PortalServiceError::ProgramNotFound)));
    let result = delete.execute(staff(admin), Uuid::now_v7()).await;
    assert!(matches!(result, Err(PortalServiceError::ProgramNotFound)));
}
