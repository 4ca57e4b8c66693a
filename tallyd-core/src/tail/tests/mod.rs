mod processor_tests;
